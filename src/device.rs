//! Compute device selection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where embedding tables live and lookups execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host memory
    #[default]
    Cpu,
    /// CUDA accelerator by ordinal
    Cuda(usize),
}

impl Device {
    /// Whether a backend for this device is compiled in
    pub fn is_available(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Fail unless the device can hold tensors in this build
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::UnsupportedDevice(format!(
                "{self} requested but only the host backend is built"
            )))
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda(0)),
            other => match other.strip_prefix("cuda:") {
                Some(ordinal) => ordinal
                    .parse()
                    .map(Device::Cuda)
                    .map_err(|_| Error::ConfigError(format!("invalid CUDA ordinal in '{s}'"))),
                None => Err(Error::ConfigError(format!(
                    "unknown device '{s}' (expected cpu, cuda or cuda:N)"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:2".parse::<Device>().unwrap(), Device::Cuda(2));
        assert!("tpu".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for device in [Device::Cpu, Device::Cuda(1)] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }

    #[test]
    fn test_only_host_available() {
        assert!(Device::Cpu.ensure_available().is_ok());
        assert!(matches!(
            Device::Cuda(0).ensure_available(),
            Err(Error::UnsupportedDevice(_))
        ));
    }
}
