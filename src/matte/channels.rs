//! Channel identification for a Cryptomatte layer.
//!
//! A layer named `CryptoObject` stores its ranks in channel groups such as
//! `CryptoObject00.R`, `CryptoObject00.G`, ... where each group of four
//! channels holds two (ID, coverage) ranks.

use std::collections::BTreeSet;

/// The suffix family a renderer used for channel components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NamingScheme {
    /// `R`, `G`, `B`, `A`
    #[default]
    Upper,
    /// `r`, `g`, `b`, `a`
    Lower,
    /// `red`, `green`, `blue`, `alpha`
    Long,
}

impl NamingScheme {
    /// Recognizes the first-component suffix of a scheme.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "R" => Some(Self::Upper),
            "r" => Some(Self::Lower),
            "red" => Some(Self::Long),
            _ => None,
        }
    }

    /// The four component suffixes, in channel order.
    pub fn suffixes(self) -> [&'static str; 4] {
        match self {
            Self::Upper => ["R", "G", "B", "A"],
            Self::Lower => ["r", "g", "b", "a"],
            Self::Long => ["red", "green", "blue", "alpha"],
        }
    }

    /// The first-component suffix used as the scheme tag.
    pub fn as_str(self) -> &'static str {
        self.suffixes()[0]
    }
}

/// The ordered channels of a layer and the scheme they use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelLayout {
    pub channel_names: Vec<String>,
    pub naming_scheme: NamingScheme,
}

/// Finds the channels of `layer_name` among all channel names of an image.
///
/// A channel belongs to the layer when it reads `<layer_name><digits>.<s>`
/// with `s` one of `R`, `r`, `red`. Matching prefixes are sorted as strings,
/// so `Layer10` comes before `Layer2`; renderers zero-pad rank digits,
/// which keeps that order numeric in practice. The scheme is taken from
/// the last matching channel; with no match it defaults to `R/G/B/A`.
pub fn identify_channels<'a, I>(layer_name: &str, channels: I) -> ChannelLayout
where
    I: IntoIterator<Item = &'a str>,
{
    let mut prefixes: BTreeSet<&'a str> = BTreeSet::new();
    let mut naming_scheme = NamingScheme::default();

    for channel in channels {
        if let Some((prefix, scheme)) = match_rank_channel(layer_name, channel) {
            prefixes.insert(prefix);
            naming_scheme = scheme;
        }
    }

    let channel_names = prefixes
        .iter()
        .flat_map(|prefix| {
            naming_scheme
                .suffixes()
                .into_iter()
                .map(move |suffix| format!("{prefix}.{suffix}"))
        })
        .collect();

    ChannelLayout {
        channel_names,
        naming_scheme,
    }
}

/// Returns the `<layer_name><digits>` prefix and scheme of a rank channel.
fn match_rank_channel<'a>(layer_name: &str, channel: &'a str) -> Option<(&'a str, NamingScheme)> {
    let rest = channel.strip_prefix(layer_name)?;
    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let suffix = rest[digit_count..].strip_prefix('.')?;
    let scheme = NamingScheme::from_suffix(suffix)?;
    let prefix_len = layer_name.len() + digit_count;
    Some((&channel[..prefix_len], scheme))
}
