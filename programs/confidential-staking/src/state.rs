use solana_sdk::pubkey::Pubkey;

/// The two custodied confidential assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Primary,
    Secondary,
}

impl AssetClass {
    pub const ALL: [AssetClass; 2] = [AssetClass::Primary, AssetClass::Secondary];

    pub const fn index(self) -> usize {
        match self {
            AssetClass::Primary => 0,
            AssetClass::Secondary => 1,
        }
    }
}

/// Key of a stake position: one per (account, asset class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub account: Pubkey,
    pub class: AssetClass,
}

impl PositionKey {
    pub fn new(account: Pubkey, class: AssetClass) -> Self {
        Self { account, class }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_class_indices_are_distinct() {
        assert_eq!(AssetClass::Primary.index(), 0);
        assert_eq!(AssetClass::Secondary.index(), 1);
        assert_eq!(AssetClass::ALL.len(), 2);
    }

    #[test]
    fn test_position_key_separates_classes() {
        let account = Pubkey::new_unique();
        assert_ne!(
            PositionKey::new(account, AssetClass::Primary),
            PositionKey::new(account, AssetClass::Secondary)
        );
    }
}
