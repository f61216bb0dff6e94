use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use std::collections::HashMap;

/// Image flavors the API serves for shows, episodes, seasons, people and
/// characters. Used as dictionary keys in `image` payload fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Medium,
    Original,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Medium => "medium",
            ImageType::Original => "original",
        }
    }
}

/// Keys of the `_links` dictionary attached to most resources.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[serde(rename = "self")]
    SelfLink,
    Show,
    Character,
    #[serde(rename = "previousepisode")]
    PreviousEpisode,
    #[serde(rename = "nextepisode")]
    NextEpisode,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::SelfLink => "self",
            LinkType::Show => "show",
            LinkType::Character => "character",
            LinkType::PreviousEpisode => "previousepisode",
            LinkType::NextEpisode => "nextepisode",
        }
    }
}

/// Sub-resources the API can inline under `_embedded` when requested with
/// the `embed` query parameter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    Episodes,
    Cast,
    #[serde(rename = "castcredits")]
    CastCredits,
    Show,
}

impl EmbedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedType::Episodes => "episodes",
            EmbedType::Cast => "cast",
            EmbedType::CastCredits => "castcredits",
            EmbedType::Show => "show",
        }
    }
}

/// External databases the lookup endpoint accepts ids from. The wire string
/// doubles as the query parameter name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ExternalTvShowProvider {
    #[serde(rename = "tvrage")]
    TvRage,
    #[serde(rename = "thetvdb")]
    TheTvDb,
    #[serde(rename = "imdb")]
    Imdb,
}

impl ExternalTvShowProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalTvShowProvider::TvRage => "tvrage",
            ExternalTvShowProvider::TheTvDb => "thetvdb",
            ExternalTvShowProvider::Imdb => "imdb",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Country {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Network {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub country: Option<Country>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebChannel {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub country: Option<Country>,
}

/// Weekly airing slot of a show, e.g. 22:00 on Thursdays.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ShowSchedule {
    #[serde(default, deserialize_with = "null_to_default")]
    pub time: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub days: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Rating {
    pub average: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Show {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: String,
    pub runtime: Option<i64>,
    pub premiered: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub schedule: ShowSchedule,
    #[serde(default, deserialize_with = "null_to_default")]
    pub rating: Rating,
    #[serde(default)]
    pub weight: i64,
    pub network: Option<Network>,
    #[serde(rename = "webChannel", default)]
    pub web_channel: Option<WebChannel>,
    #[serde(default, deserialize_with = "externals_to_strings")]
    pub externals: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub image: HashMap<ImageType, String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub updated: i64,
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
    /// Main cast, populated only when the payload embeds it.
    #[serde(default)]
    pub casts: Option<Vec<Cast>>,
    /// Episode list, populated only when the payload embeds it.
    #[serde(default)]
    pub episodes: Option<Vec<Episode>>,
}

#[derive(Debug, Error)]
pub enum AirStampError {
    #[error("no airstamp present")]
    Missing,
    #[error("failed to parse airstamp")]
    Parse(#[source] chrono::ParseError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub season: i64,
    /// Ordinal number within the season; absent for specials.
    pub number: Option<i64>,
    pub airdate: Option<String>,
    pub airtime: Option<String>,
    pub airstamp: Option<String>,
    pub runtime: Option<i64>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub image: HashMap<ImageType, String>,
    pub summary: Option<String>,
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
    /// Owning show; present inline in schedule payloads, or attached from
    /// `_embedded.show` when the episode was fetched with an embed.
    #[serde(default)]
    pub show: Option<Show>,
}

impl Episode {
    /// Airing moment with its original UTC offset, parsed from the verbatim
    /// `airstamp` string.
    pub fn air_timestamp(&self) -> Result<DateTime<FixedOffset>, AirStampError> {
        let stamp = self.airstamp.as_deref().ok_or(AirStampError::Missing)?;
        DateTime::parse_from_rfc3339(stamp).map_err(AirStampError::Parse)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Season {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub number: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(rename = "episodeOrder", default)]
    pub episode_order: Option<i64>,
    #[serde(rename = "premiereDate", default)]
    pub premiere_date: Option<NaiveDate>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<NaiveDate>,
    pub network: Option<Network>,
    #[serde(rename = "webChannel", default)]
    pub web_channel: Option<WebChannel>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub image: HashMap<ImageType, String>,
    pub summary: Option<String>,
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    pub country: Option<Country>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub image: HashMap<ImageType, String>,
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
    /// Cast credits, populated only when the payload embeds them.
    #[serde(default)]
    pub cast_credits: Option<Vec<CastCredit>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Character {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub image: HashMap<ImageType, String>,
}

/// A person playing a character on one show.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cast {
    pub person: Person,
    pub character: Character,
    #[serde(rename = "self", default)]
    pub is_self: bool,
    #[serde(default)]
    pub voice: bool,
}

/// A person filling a production role on one show.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Crew {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub person: Person,
}

/// Links a person to a show and character across the database. The show is
/// only populated when the source payload embedded it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CastCredit {
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
    #[serde(default)]
    pub show: Option<Show>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CrewCredit {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "_links", default, deserialize_with = "null_to_default")]
    pub links: HashMap<LinkType, Link>,
    #[serde(default)]
    pub show: Option<Show>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Alias {
    #[serde(default)]
    pub name: String,
    pub country: Option<Country>,
}

/// Relevance-scored wrapper around a search hit. `element` is a [`Show`] or
/// a [`Person`] depending on the endpoint.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub score: f64,
    pub element: T,
}

/// Episodes airing on a given date/country, or the complete future list.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Schedule {
    pub episodes: Vec<Episode>,
}

/// One entry of the show-update feed: a show id and the unix time it was
/// last touched.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub struct ShowUpdate {
    pub show_id: String,
    pub timestamp: i64,
}

impl ShowUpdate {
    /// Update moment as a UTC datetime. `None` when the timestamp is out of
    /// chrono's representable range.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// The API writes `null` instead of omitting empty maps and strings; fold
/// both spellings into the type's default.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// External ids arrive as a mix of numbers and strings ("tvrage": 25988,
/// "imdb": "tt1553656"); normalize everything to strings and drop nulls.
fn externals_to_strings<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, serde_json::Value>>::deserialize(deserializer)?
        .unwrap_or_default();

    let mut externals = HashMap::new();
    for (provider, id) in raw {
        match id {
            serde_json::Value::String(s) => {
                externals.insert(provider, s);
            }
            serde_json::Value::Number(n) => {
                externals.insert(provider, n.to_string());
            }
            serde_json::Value::Null => {}
            other => {
                return Err(serde::de::Error::custom(format!(
                    "unexpected external id {other} for provider {provider}"
                )));
            }
        }
    }

    Ok(externals)
}
