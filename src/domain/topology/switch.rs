use crate::domain::utils::id::{DeviceId, SwitchNumber};

/// Largest topology whose host addresses fit in `10.0.0.1` to `10.0.0.254`.
pub const MAX_SWITCHES: usize = 254;

/// A network node together with its attached host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub name: String,
    pub number: SwitchNumber,

    /// Address of the host behind this switch, in CIDR form (`10.0.0.<n>/32`).
    pub ip: String,

    /// Southbound device identifier (`of:` + 16 hex digits).
    pub device: DeviceId,
}

impl Switch {
    /// Creates the switch at `index` (0-based position in the node list).
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        let number = SwitchNumber(index as u32 + 1);

        Self { name: name.into(), number, ip: format!("10.0.0.{}/32", number.0), device: Switch::device_for(number) }
    }

    pub fn device_for(number: SwitchNumber) -> DeviceId {
        DeviceId::new(format!("of:{:016x}", number.0))
    }

    /// Host address without the prefix length.
    pub fn host_address(&self) -> &str {
        self.ip.split('/').next().unwrap_or(&self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_follow_load_order() {
        let switch = Switch::new("Wieden", 9);

        assert_eq!(switch.number, SwitchNumber(10));
        assert_eq!(switch.ip, "10.0.0.10/32");
        assert_eq!(switch.host_address(), "10.0.0.10");
        assert_eq!(switch.device.as_str(), "of:000000000000000a");
    }
}
