// ============================================================
// Layer 3 — Device Target
// ============================================================
// Where batches and parameters live. Parsed from the command
// line and stored in configs; the ml layer resolves it into a
// concrete backend device.
//
// Accepted spellings:
//   cpu, -1          → Cpu
//   gpu:N, cuda:N, N → Accelerator(N)

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Compute target for tensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceTarget {
    #[default]
    Cpu,
    /// An accelerator identified by its non-negative index
    Accelerator(usize),
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTarget::Cpu => write!(f, "cpu"),
            DeviceTarget::Accelerator(id) => write!(f, "gpu:{id}"),
        }
    }
}

impl FromStr for DeviceTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "cpu" || s == "-1" {
            return Ok(DeviceTarget::Cpu);
        }

        let id = s
            .strip_prefix("gpu:")
            .or_else(|| s.strip_prefix("cuda:"))
            .unwrap_or(&s);

        id.parse::<usize>()
            .map(DeviceTarget::Accelerator)
            .map_err(|_| {
                Error::Config(format!(
                    "unknown device '{s}'; expected 'cpu', 'gpu:N', 'cuda:N' or a device id"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_cpu_spellings() {
        assert_eq!("cpu".parse::<DeviceTarget>().unwrap(), DeviceTarget::Cpu);
        assert_eq!("CPU".parse::<DeviceTarget>().unwrap(), DeviceTarget::Cpu);
        assert_eq!("-1".parse::<DeviceTarget>().unwrap(), DeviceTarget::Cpu);
    }

    #[test]
    fn test_parses_accelerator_ids() {
        assert_eq!("0".parse::<DeviceTarget>().unwrap(), DeviceTarget::Accelerator(0));
        assert_eq!("gpu:2".parse::<DeviceTarget>().unwrap(), DeviceTarget::Accelerator(2));
        assert_eq!("cuda:1".parse::<DeviceTarget>().unwrap(), DeviceTarget::Accelerator(1));
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!("-2".parse::<DeviceTarget>().is_err());
        assert!("tpu".parse::<DeviceTarget>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for target in [DeviceTarget::Cpu, DeviceTarget::Accelerator(3)] {
            let parsed: DeviceTarget = target.to_string().parse().unwrap();
            assert_eq!(parsed, target);
        }
    }
}
