use poer_thermostat::{
    HvacMode, MessageLogMode, Preset, Temperature, ThermostatClient, VendorKind,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTENT_PATH: &str = "/api/v1/smarthome";

fn sync_body() -> Value {
    json!({
        "requestId": "ignored",
        "payload": { "devices": [
            { "device_id": "t1", "name": "Hall", "model": "POER WiFi", "firmware": "2.0.1",
              "minTemp": 5.0, "maxTemp": 30.0 },
            { "id": "t2", "name": "Study" }
        ]}
    })
}

fn query_body(id: &str, mode: &str) -> Value {
    let mut devices = serde_json::Map::new();
    devices.insert(
        id.to_string(),
        json!({
            "online": true,
            "thermostatMode": mode,
            "activeThermostatMode": "heat",
            "thermostatTemperatureAmbient": 19.5,
            "thermostatHumidityAmbient": 48,
            "thermostatTemperatureSetpoint": 17.0
        }),
    );
    json!({ "payload": { "devices": devices } })
}

fn execute_body(status: &str) -> Value {
    json!({ "payload": { "commands": [{ "ids": ["t1"], "status": status }] } })
}

fn query_for(id: &str) -> Value {
    json!({ "inputs": [{
        "intent": "action.devices.QUERY",
        "payload": { "devices": [{ "id": id }] }
    }] })
}

async fn mount_poll_mocks(server: &MockServer, t1_mode: &str) {
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.SYNC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_body()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_partial_json(query_for("t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(query_body("t1", t1_mode)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_partial_json(query_for("t2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(query_body("t2", "auto")))
        .mount(server)
        .await;
}

async fn polled_client(server: &MockServer, t1_mode: &str) -> ThermostatClient {
    mount_poll_mocks(server, t1_mode).await;
    let client = ThermostatClient::builder("cn-secret")
        .vendor(VendorKind::Intent)
        .base_url(server.uri())
        .build()
        .unwrap();
    client.poll().await.expect("poll should succeed");
    client
}

async fn executed_params(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.body_json::<Value>().ok())
        .filter(|b| b["inputs"][0]["intent"] == "action.devices.EXECUTE")
        .map(|b| b["inputs"][0]["payload"]["commands"][0]["execution"][0].clone())
        .collect()
}

#[tokio::test]
async fn sync_uses_bearer_token_and_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(header("authorization", "Bearer secret"))
        .and(body_string_contains("action.devices.SYNC"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "payload": { "devices": [] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ThermostatClient::builder("cn-secret")
        .vendor(VendorKind::Intent)
        .base_url(server.uri())
        .build()
        .unwrap();
    client.poll().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert!(!body["requestId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn eco_mode_reads_as_heat_away() {
    let server = MockServer::start().await;
    let client = polled_client(&server, "eco").await;

    let t1 = client.device("t1").unwrap();
    assert_eq!(t1.mode, HvacMode::Heat);
    assert_eq!(t1.preset, Preset::Away);
    assert_eq!(t1.vendor_mode.as_deref(), Some("eco"));
    assert_eq!(t1.current_temp, Some(Temperature::from_celsius(19.5)));
    assert_eq!(t1.current_humidity, Some(48.0));
    assert_eq!(t1.min_temp.celsius(), 5.0);
    assert_eq!(t1.max_temp.celsius(), 30.0);

    let t2 = client.device("t2").unwrap();
    assert_eq!(t2.mode, HvacMode::Auto);
    assert_eq!(t2.preset, Preset::Home);
    assert_eq!(t2.max_temp.celsius(), 35.0);
}

#[tokio::test]
async fn away_preset_sends_eco_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .mount(&server)
        .await;
    let client = polled_client(&server, "auto").await;

    assert!(client.set_preset_mode("t1", Preset::Away).await);

    let executed = executed_params(&server).await;
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0]["command"], "action.devices.commands.ThermostatSetMode");
    assert_eq!(executed[0]["params"]["thermostatMode"], "eco");

    let t1 = client.device("t1").unwrap();
    assert_eq!(t1.preset, Preset::Away);
    assert_eq!(t1.mode, HvacMode::Heat);
}

#[tokio::test]
async fn away_while_already_eco_still_sends_eco() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .mount(&server)
        .await;
    let client = polled_client(&server, "eco").await;

    assert!(client.set_preset_mode("t1", Preset::Away).await);
    let executed = executed_params(&server).await;
    assert_eq!(executed[0]["params"]["thermostatMode"], "eco");
}

#[tokio::test]
async fn home_preset_from_away_sends_heat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("PENDING")))
        .mount(&server)
        .await;
    let client = polled_client(&server, "eco").await;

    assert!(client.set_preset_mode("t1", Preset::Home).await);
    let executed = executed_params(&server).await;
    assert_eq!(executed[0]["params"]["thermostatMode"], "heat");
    assert_eq!(client.device("t1").unwrap().preset, Preset::Home);
}

#[tokio::test]
async fn set_mode_clears_away() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .mount(&server)
        .await;
    let client = polled_client(&server, "eco").await;

    assert!(client.set_hvac_mode("t1", HvacMode::Auto).await);
    let executed = executed_params(&server).await;
    assert_eq!(executed[0]["params"]["thermostatMode"], "auto");

    let t1 = client.device("t1").unwrap();
    assert_eq!(t1.mode, HvacMode::Auto);
    assert_eq!(t1.preset, Preset::Home);
}

#[tokio::test]
async fn setpoint_clamped_to_vendor_range() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .mount(&server)
        .await;
    let client = polled_client(&server, "heat").await;

    assert!(client.set_temperature("t1", Temperature::from_celsius(32.0)).await);
    let executed = executed_params(&server).await;
    assert_eq!(
        executed[0]["command"],
        "action.devices.commands.ThermostatTemperatureSetpoint"
    );
    assert_eq!(executed[0]["params"]["thermostatTemperatureSetpoint"], 30.0);
}

#[tokio::test]
async fn execute_error_reverts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": { "commands": [
                { "ids": ["t1"], "status": "ERROR", "errorCode": "deviceOffline" }
            ] }
        })))
        .mount(&server)
        .await;
    let client = polled_client(&server, "auto").await;
    let confirmed = client.device("t1").unwrap();

    assert!(!client.set_preset_mode("t1", Preset::Away).await);
    assert_eq!(client.device("t1").unwrap(), confirmed);
}

#[tokio::test]
async fn malformed_execute_reply_reverts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    let client = polled_client(&server, "auto").await;

    assert!(!client.set_hvac_mode("t1", HvacMode::Off).await);
    assert_eq!(client.device("t1").unwrap().mode, HvacMode::Auto);
}

#[tokio::test]
async fn query_error_degrades_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.SYNC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_partial_json(query_for("t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": { "devices": { "t1": { "status": "ERROR", "errorCode": "deviceOffline" } } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_partial_json(query_for("t2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(query_body("t2", "off")))
        .mount(&server)
        .await;

    let client = ThermostatClient::builder("cn-secret")
        .vendor(VendorKind::Intent)
        .base_url(server.uri())
        .build()
        .unwrap();
    client.poll().await.unwrap();

    let t1 = client.device("t1").unwrap();
    assert!(!t1.status_available);
    assert_eq!(t1.name, "Hall");
    let t2 = client.device("t2").unwrap();
    assert!(t2.status_available);
    assert_eq!(t2.mode, HvacMode::Off);
}

#[tokio::test]
async fn inverted_vendor_range_falls_back_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.SYNC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": { "devices": [{ "id": "t1", "maxTemp": 5.0 }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_partial_json(query_for("t1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(query_body("t1", "heat")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .mount(&server)
        .await;

    let client = ThermostatClient::builder("cn-secret")
        .vendor(VendorKind::Intent)
        .base_url(server.uri())
        .build()
        .unwrap();
    client.poll().await.unwrap();

    let t1 = client.device("t1").unwrap();
    assert_eq!(t1.min_temp.celsius(), 7.0);
    assert_eq!(t1.max_temp.celsius(), 35.0);

    assert!(client.set_temperature("t1", Temperature::from_celsius(20.0)).await);
    let executed = executed_params(&server).await;
    assert_eq!(executed[0]["params"]["thermostatTemperatureSetpoint"], 20.0);
}

#[tokio::test]
async fn non_finite_setpoint_never_executes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .expect(0)
        .mount(&server)
        .await;
    let client = polled_client(&server, "heat").await;

    assert!(!client.set_temperature("t1", Temperature::from_celsius(f64::NAN)).await);
    assert_eq!(
        client.device("t1").unwrap().target_temp,
        Some(Temperature::from_celsius(17.0))
    );
}

#[tokio::test]
async fn temperature_range_rejected_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INTENT_PATH))
        .and(body_string_contains("action.devices.EXECUTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execute_body("SUCCESS")))
        .expect(0)
        .mount(&server)
        .await;
    let client = polled_client(&server, "heat").await;
    let confirmed = client.device("t1").unwrap();

    let ok = client
        .set_temperature_range(
            "t1",
            Temperature::from_celsius(18.0),
            Temperature::from_celsius(22.0),
        )
        .await;
    assert!(!ok);
    assert_eq!(client.device("t1").unwrap(), confirmed);
}

#[tokio::test]
async fn message_log_records_intent_envelopes() {
    let server = MockServer::start().await;
    mount_poll_mocks(&server, "auto").await;

    let tmp = tempfile::NamedTempFile::new().unwrap();
    let log_path = tmp.path().to_str().unwrap().to_string();
    let client = ThermostatClient::builder("cn-secret")
        .vendor(VendorKind::Intent)
        .base_url(server.uri())
        .message_log(MessageLogMode::Full, &log_path)
        .build()
        .unwrap();
    client.poll().await.unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let requests: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).unwrap())
        .filter(|l| l["dir"] == "req")
        .collect();
    assert_eq!(requests.len(), 3);
    for r in &requests {
        assert_eq!(r["method"], "POST");
        assert_eq!(r["path"], INTENT_PATH);
    }
    assert_eq!(requests[0]["body"]["inputs"][0]["intent"], "action.devices.SYNC");
    assert_eq!(requests[1]["body"]["inputs"][0]["intent"], "action.devices.QUERY");
}
