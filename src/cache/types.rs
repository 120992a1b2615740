use std::fmt;

/// Opaque payload stored by every value-holding tier.
pub type CacheValue = String;

/// Position of a tier in the hierarchy, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TierKind {
    Recency,
    Shared,
    Filter,
    Authoritative,
}

impl TierKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Recency => "recency",
            TierKind::Shared => "shared",
            TierKind::Filter => "filter",
            TierKind::Authoritative => "authoritative",
        }
    }

    /// Whether `set` and promotion write into this tier.
    #[inline]
    pub fn accepts_writes(&self) -> bool {
        !matches!(self, TierKind::Authoritative)
    }

    #[inline]
    pub fn status(&self) -> CacheStatus {
        match self {
            TierKind::Recency => CacheStatus::HitL1Recency,
            TierKind::Shared => CacheStatus::HitL2Shared,
            TierKind::Filter => CacheStatus::HitL3Filter,
            TierKind::Authoritative => CacheStatus::HitL4Authoritative,
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer of a single tier for a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierResult {
    /// Present, with its value.
    Hit(CacheValue),
    /// Possibly present, value unknown. Only the membership filter answers this.
    MaybePresent,
    Miss,
}

impl TierResult {
    #[inline]
    pub fn from_option(value: Option<CacheValue>) -> Self {
        match value {
            Some(value) => TierResult::Hit(value),
            None => TierResult::Miss,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, TierResult::Hit(_))
    }

    #[inline]
    pub fn into_value(self) -> Option<CacheValue> {
        match self {
            TierResult::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// What the caller is asking for. A filter hit answers `Existence` but not `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    Value,
    Existence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    HitL1Recency,
    HitL2Shared,
    HitL3Filter,
    HitL4Authoritative,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::HitL1Recency => "HIT_L1_RECENCY",
            CacheStatus::HitL2Shared => "HIT_L2_SHARED",
            CacheStatus::HitL3Filter => "HIT_L3_FILTER",
            CacheStatus::HitL4Authoritative => "HIT_L4_AUTHORITATIVE",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        !matches!(self, CacheStatus::Miss)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a cascading lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayeredLookupResult {
    /// A tier returned the value.
    Hit { tier: TierKind, value: CacheValue },
    /// A tier vouched for existence without a value (existence lookups only).
    Present { tier: TierKind },
    Miss,
}

impl LayeredLookupResult {
    pub fn status(&self) -> CacheStatus {
        match self {
            LayeredLookupResult::Hit { tier, .. } | LayeredLookupResult::Present { tier } => {
                tier.status()
            }
            LayeredLookupResult::Miss => CacheStatus::Miss,
        }
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, LayeredLookupResult::Miss)
    }

    /// The tier that answered, if any.
    pub fn tier(&self) -> Option<TierKind> {
        match self {
            LayeredLookupResult::Hit { tier, .. } | LayeredLookupResult::Present { tier } => {
                Some(*tier)
            }
            LayeredLookupResult::Miss => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            LayeredLookupResult::Hit { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<CacheValue> {
        match self {
            LayeredLookupResult::Hit { value, .. } => Some(value),
            _ => None,
        }
    }
}
