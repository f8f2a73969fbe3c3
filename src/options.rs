/// What to do with a timestamp whose ticks fall outside the calendar range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TimestampRangePolicy {
    /// Abort the block with a range fault.
    #[default]
    Fail,
    /// Keep the cell as `Value::RawTimestamp` and continue.
    KeepTicks,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct DecodeOptions {
    out_of_range_timestamps: TimestampRangePolicy,
    binary_as_bytes: bool,
}

impl DecodeOptions {
    pub fn set_out_of_range_timestamps(&mut self, policy: TimestampRangePolicy) -> &mut Self {
        self.out_of_range_timestamps = policy;
        self
    }

    /// Decode `varchar` payloads as raw bytes instead of UTF-8 text.
    pub fn set_binary_as_bytes(&mut self, enabled: bool) -> &mut Self {
        self.binary_as_bytes = enabled;
        self
    }

    pub fn out_of_range_timestamps(&self) -> TimestampRangePolicy {
        self.out_of_range_timestamps
    }

    pub fn binary_as_bytes(&self) -> bool {
        self.binary_as_bytes
    }
}
