//! Option store: ranged values with lifecycle-dependent write windows

use std::collections::BTreeMap;

use contracts::{OptionConfig, OptionKind, OptionMutability, OptionRange, Result, SdkError};

#[derive(Debug, Clone)]
struct OptionEntry {
    description: String,
    range: OptionRange,
    mutability: OptionMutability,
    value: f32,
}

/// Current option values of one physical sensor
///
/// A rejected write leaves every value unchanged.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    entries: BTreeMap<OptionKind, OptionEntry>,
}

impl OptionStore {
    pub fn from_configs(configs: &[OptionConfig]) -> Self {
        let entries = configs
            .iter()
            .map(|c| {
                let entry = OptionEntry {
                    description: c.description(),
                    range: c.range(),
                    mutability: c.mutability,
                    value: c.initial_value(),
                };
                (c.kind, entry)
            })
            .collect();
        Self { entries }
    }

    /// Supported kinds in `OptionKind` order
    pub fn kinds(&self) -> Vec<OptionKind> {
        self.entries.keys().copied().collect()
    }

    pub fn supports(&self, kind: OptionKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn description(&self, kind: OptionKind) -> Option<String> {
        self.entries.get(&kind).map(|e| e.description.clone())
    }

    pub fn range(&self, kind: OptionKind) -> Option<OptionRange> {
        self.entries.get(&kind).map(|e| e.range)
    }

    pub fn mutability(&self, kind: OptionKind) -> Option<OptionMutability> {
        self.entries.get(&kind).map(|e| e.mutability)
    }

    pub fn get(&self, kind: OptionKind) -> Result<f32> {
        self.entries.get(&kind).map(|e| e.value).ok_or_else(|| {
            SdkError::unsupported(
                "get_option",
                format!("option: {kind}"),
                "option not supported by this sensor",
            )
        })
    }

    /// Commit `value` if it is in range and writable while `streaming`
    pub fn set(&mut self, kind: OptionKind, value: f32, streaming: bool) -> Result<()> {
        let args = || format!("option: {kind}, value: {value}");

        let Some(entry) = self.entries.get_mut(&kind) else {
            return Err(SdkError::unsupported(
                "set_option",
                args(),
                "option not supported by this sensor",
            ));
        };

        if !entry.range.contains(value) {
            return Err(SdkError::out_of_range(
                "set_option",
                args(),
                format!(
                    "value {value} outside range [{}, {}]",
                    entry.range.min, entry.range.max
                ),
            ));
        }

        match (entry.mutability, streaming) {
            (OptionMutability::StreamingOnly, false) => {
                return Err(SdkError::invalid_state(
                    "set_option",
                    args(),
                    "option can only be set while streaming",
                ));
            }
            (OptionMutability::IdleOnly, true) => {
                return Err(SdkError::invalid_state(
                    "set_option",
                    args(),
                    "option cannot be set while streaming",
                ));
            }
            _ => {}
        }

        entry.value = value;
        Ok(())
    }
}
