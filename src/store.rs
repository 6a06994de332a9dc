use crate::types::DeviceRecord;

/// Last confirmed poll plus the records the host currently sees.
///
/// `visible` starts as a copy of `confirmed` after every successful poll;
/// commands write into it tentatively and are undone by copying the
/// confirmed record back over it.
#[derive(Debug, Default)]
pub(crate) struct Store {
    confirmed: Vec<DeviceRecord>,
    visible: Vec<DeviceRecord>,
}

impl Store {
    pub fn replace(&mut self, records: Vec<DeviceRecord>) {
        self.confirmed = records.clone();
        self.visible = records;
    }

    pub fn visible(&self) -> &[DeviceRecord] {
        &self.visible
    }

    pub fn find(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.visible.iter().find(|r| r.device_id == device_id)
    }

    /// Apply a tentative change. Returns false if the device is gone.
    pub fn apply(&mut self, device_id: &str, f: impl FnOnce(&mut DeviceRecord)) -> bool {
        match self.visible.iter_mut().find(|r| r.device_id == device_id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Overwrite the visible record with the confirmed one.
    pub fn revert(&mut self, device_id: &str) -> bool {
        let Some(confirmed) = self.confirmed.iter().find(|r| r.device_id == device_id) else {
            return false;
        };
        match self.visible.iter_mut().find(|r| r.device_id == device_id) {
            Some(visible) => {
                *visible = confirmed.clone();
                true
            }
            None => false,
        }
    }
}
