//! Codec limits.

/// Limits applied by the encoder and decoder.
///
/// Serialized records come from other processes and are treated as
/// untrusted; these bounds keep recursion and allocation proportional to
/// what a legitimate tag set needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum depth of struct fields and nested entities.
    pub max_nesting_depth: usize,

    /// Maximum number of pairs in one record.
    pub max_pairs: u64,

    /// Maximum size of a single key or value payload.
    pub max_payload_size: u64,

    /// Slots reserved up front for each decoded record, capped by `max_pairs`
    /// and by what the remaining input could hold.
    pub initial_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 16,
            max_pairs: 16 * 1024 * 1024,
            max_payload_size: 256 * 1024 * 1024, // 256 MB
            initial_capacity: 8,
        }
    }
}

impl CodecConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Sets the maximum number of pairs per record.
    #[must_use]
    pub const fn max_pairs(mut self, pairs: u64) -> Self {
        self.max_pairs = pairs;
        self
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn max_payload_size(mut self, size: u64) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Sets the initial slot reservation for decoded records.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_nesting_depth, 16);
        assert_eq!(config.max_payload_size, 256 * 1024 * 1024);
        assert_eq!(config.initial_capacity, 8);
    }

    #[test]
    fn builder_pattern() {
        let config = CodecConfig::new()
            .max_nesting_depth(4)
            .max_pairs(100)
            .max_payload_size(1024)
            .initial_capacity(2);

        assert_eq!(config.max_nesting_depth, 4);
        assert_eq!(config.max_pairs, 100);
        assert_eq!(config.max_payload_size, 1024);
        assert_eq!(config.initial_capacity, 2);
    }
}
