//! Render priority buckets.

use stagehand_test_utils::Bucket;

/// Render priority of a view. Higher priorities draw on top of lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ViewPriority {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
    Ultra = 3,
}

impl ViewPriority {
    /// All priorities, lowest first.
    pub const ALL: [ViewPriority; 4] = [
        ViewPriority::Low,
        ViewPriority::Medium,
        ViewPriority::High,
        ViewPriority::Ultra,
    ];

    /// Sibling index of this priority's bucket.
    pub const fn order(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            ViewPriority::Low => "LowRenderPriority",
            ViewPriority::Medium => "MediumRenderPriority",
            ViewPriority::High => "HighRenderPriority",
            ViewPriority::Ultra => "UltraRenderPriority",
        }
    }

    /// The host bucket views of this priority are parented to.
    pub const fn bucket(self) -> Bucket {
        Bucket::layer(self.name(), self.order())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium() {
        assert_eq!(ViewPriority::default(), ViewPriority::Medium);
    }

    #[test]
    fn test_buckets_are_ordered() {
        let orders: Vec<u8> = ViewPriority::ALL
            .iter()
            .map(|p| match p.bucket() {
                Bucket::Layer { order, .. } => order,
                Bucket::Holding => u8::MAX,
            })
            .collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert!(ViewPriority::Ultra > ViewPriority::Low);
    }
}
