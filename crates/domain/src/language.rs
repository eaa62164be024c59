use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    De,
    Es,
    Ta,
}

impl Language {
    pub const DEFAULT: Language = Language::En;

    pub fn iter() -> impl Iterator<Item = Language> {
        <Self as IntoEnumIterator>::iter()
    }
}
