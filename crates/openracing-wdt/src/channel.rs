//! Reload channel identifiers and request bitmasks.

/// Most reload channels one instance can address; one bit each in a
/// [`RequestMask`].
pub const MAX_CHANNELS: u8 = 32;

/// Identifier of an allocated reload channel.
///
/// Obtained only from [`Wdt::allocate_channel`](crate::Wdt::allocate_channel);
/// holding one is the right to feed that slot. Channels are never freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    pub(crate) const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Zero-based index of the reload-request register.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Single-bit mask of this channel in a [`RequestMask`].
    ///
    /// Zero for an index at or above [`MAX_CHANNELS`].
    #[must_use]
    pub const fn mask(self) -> u32 {
        match 1u32.checked_shl(self.0 as u32) {
            Some(bit) => bit,
            None => 0,
        }
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RR{}", self.0)
    }
}

/// Bitmask of reload-request channels, bit `n` standing for channel `n`.
///
/// Delivered to the timeout handler with the channels whose reload request
/// was still outstanding when the counter expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestMask(u32);

impl RequestMask {
    /// Mask with no channel set.
    pub const EMPTY: Self = Self(0);

    /// Wrap raw register bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `channel` is set.
    #[must_use]
    pub const fn contains(self, channel: ChannelId) -> bool {
        self.0 & channel.mask() != 0
    }

    /// Whether the channel with the given index is set.
    #[must_use]
    pub const fn contains_index(self, index: u8) -> bool {
        self.0 & ChannelId(index).mask() != 0
    }

    /// Whether no channel is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of channels set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Copy with `channel` set.
    #[must_use]
    pub const fn with(self, channel: ChannelId) -> Self {
        Self(self.0 | channel.mask())
    }

    /// Iterate over the indices of the set channels, lowest first.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..MAX_CHANNELS).filter(move |&i| self.contains_index(i))
    }
}

impl core::fmt::Display for RequestMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<RequestMask> for u32 {
    fn from(mask: RequestMask) -> Self {
        mask.0
    }
}
