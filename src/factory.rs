//! Builds domain objects out of raw response bodies. All functions are pure;
//! the client hands them a body string and gets a typed value back.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;

use std::collections::BTreeMap;

use crate::domain::{
    Alias, Cast, CastCredit, Crew, CrewCredit, Episode, Person, Schedule, SearchResult, Season,
    Show, ShowUpdate,
};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("json input is empty")]
    EmptyInput,
    #[error("failed to parse json data")]
    Parse(#[source] serde_json::Error),
    #[error("update timestamp for show {0} is not numeric")]
    Timestamp(String),
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, FactoryError> {
    if json.trim().is_empty() {
        return Err(FactoryError::EmptyInput);
    }

    serde_json::from_str(json).map_err(FactoryError::Parse)
}

fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, FactoryError> {
    serde_json::from_value(value.clone()).map_err(FactoryError::Parse)
}

/// The embed convention is uniform across resources: when the request asked
/// for an embed, the sub-resource sits under `_embedded.{key}`. Deserialize
/// it into `slot` if present, leave `slot` untouched otherwise. Absence and
/// emptiness stay distinct.
fn attach_embedded<T: DeserializeOwned>(
    value: &Value,
    key: &str,
    slot: &mut Option<T>,
) -> Result<(), FactoryError> {
    if let Some(embedded) = value.get("_embedded").and_then(|e| e.get(key)) {
        *slot = Some(from_value(embedded)?);
    }

    Ok(())
}

pub fn create_episode(json: &str) -> Result<Episode, FactoryError> {
    let value: Value = parse(json)?;
    let mut episode: Episode = from_value(&value)?;
    attach_embedded(&value, "show", &mut episode.show)?;
    Ok(episode)
}

pub fn create_episodes(json: &str) -> Result<Vec<Episode>, FactoryError> {
    parse(json)
}

pub fn create_seasons(json: &str) -> Result<Vec<Season>, FactoryError> {
    parse(json)
}

pub fn create_person(json: &str) -> Result<Person, FactoryError> {
    let value: Value = parse(json)?;
    let mut person: Person = from_value(&value)?;
    attach_embedded(&value, "castcredits", &mut person.cast_credits)?;
    Ok(person)
}

pub fn create_show(json: &str) -> Result<Show, FactoryError> {
    let value: Value = parse(json)?;
    let mut show: Show = from_value(&value)?;
    attach_embedded(&value, "cast", &mut show.casts)?;
    attach_embedded(&value, "episodes", &mut show.episodes)?;
    Ok(show)
}

/// Bulk endpoints never embed, so no `_embedded` handling at list level.
pub fn create_shows(json: &str) -> Result<Vec<Show>, FactoryError> {
    parse(json)
}

/// The update feed is a map of show id to unix seconds, not an array. The
/// timestamp arrives either as a number or a numeric string.
pub fn create_show_updates(json: &str) -> Result<Vec<ShowUpdate>, FactoryError> {
    let raw: BTreeMap<String, Value> = parse(json)?;

    raw.into_iter()
        .map(|(show_id, value)| {
            let timestamp = match &value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            }
            .ok_or_else(|| FactoryError::Timestamp(show_id.clone()))?;

            Ok(ShowUpdate { show_id, timestamp })
        })
        .collect()
}

pub fn create_schedule(json: &str) -> Result<Schedule, FactoryError> {
    let episodes = create_episodes(json)?;
    Ok(Schedule { episodes })
}

pub fn create_casts(json: &str) -> Result<Vec<Cast>, FactoryError> {
    parse(json)
}

pub fn create_crews(json: &str) -> Result<Vec<Crew>, FactoryError> {
    parse(json)
}

pub fn create_aliases(json: &str) -> Result<Vec<Alias>, FactoryError> {
    parse(json)
}

pub fn create_cast_credits(json: &str) -> Result<Vec<CastCredit>, FactoryError> {
    let values: Vec<Value> = parse(json)?;

    values
        .iter()
        .map(|value| {
            let mut credit: CastCredit = from_value(value)?;
            attach_embedded(value, "show", &mut credit.show)?;
            Ok(credit)
        })
        .collect()
}

pub fn create_crew_credits(json: &str) -> Result<Vec<CrewCredit>, FactoryError> {
    let values: Vec<Value> = parse(json)?;

    values
        .iter()
        .map(|value| {
            let mut credit: CrewCredit = from_value(value)?;
            attach_embedded(value, "show", &mut credit.show)?;
            Ok(credit)
        })
        .collect()
}

// The search endpoints share one wrapper shape but key the hit by resource
// kind, so each gets its own wire item feeding the generic routine.

#[derive(Deserialize)]
struct ShowSearchItem {
    score: f64,
    show: Show,
}

impl From<ShowSearchItem> for SearchResult<Show> {
    fn from(value: ShowSearchItem) -> Self {
        SearchResult {
            score: value.score,
            element: value.show,
        }
    }
}

#[derive(Deserialize)]
struct PersonSearchItem {
    score: f64,
    person: Person,
}

impl From<PersonSearchItem> for SearchResult<Person> {
    fn from(value: PersonSearchItem) -> Self {
        SearchResult {
            score: value.score,
            element: value.person,
        }
    }
}

fn create_search_results<W, T>(json: &str) -> Result<Vec<SearchResult<T>>, FactoryError>
where
    W: DeserializeOwned + Into<SearchResult<T>>,
{
    let items: Vec<W> = parse(json)?;
    Ok(items.into_iter().map(Into::into).collect())
}

pub fn create_show_search_results(json: &str) -> Result<Vec<SearchResult<Show>>, FactoryError> {
    create_search_results::<ShowSearchItem, _>(json)
}

pub fn create_people_search_results(json: &str) -> Result<Vec<SearchResult<Person>>, FactoryError> {
    create_search_results::<PersonSearchItem, _>(json)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::{ImageType, LinkType};

    #[test]
    fn test_create_episode() {
        let episode =
            create_episode(include_str!("../res/episode.json")).expect("Failed to create episode");

        assert_eq!(episode.id, 1);
        assert_eq!(
            episode.url,
            "http://www.tvmaze.com/episodes/1/under-the-dome-1x01-pilot"
        );
        assert_eq!(episode.name, "Pilot");
        assert_eq!(episode.season, 1);
        assert_eq!(episode.number, Some(1));
        assert_eq!(episode.airdate.as_deref(), Some("2013-06-24"));
        assert_eq!(episode.airtime.as_deref(), Some("22:00"));
        assert_eq!(episode.airstamp.as_deref(), Some("2013-06-24T22:00:00-04:00"));
        assert_eq!(episode.runtime, Some(60));
        assert_eq!(episode.image.len(), 2);
        assert_eq!(
            episode.image[&ImageType::Medium],
            "http://tvmazecdn.com/uploads/images/medium_landscape/1/4388.jpg"
        );
        assert_eq!(
            episode.image[&ImageType::Original],
            "http://tvmazecdn.com/uploads/images/original_untouched/1/4388.jpg"
        );
        assert_eq!(episode.links.len(), 1);
        assert_eq!(
            episode.links[&LinkType::SelfLink].href,
            "http://api.tvmaze.com/episodes/1"
        );
        assert!(episode.show.is_none());

        let stamp = episode.air_timestamp().expect("Failed to parse airstamp");
        assert_eq!(stamp.to_rfc3339(), "2013-06-24T22:00:00-04:00");
    }

    #[test]
    fn test_create_episodes() {
        let episodes = create_episodes(include_str!("../res/episodes.json"))
            .expect("Failed to create episodes");

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, 1);
        assert_eq!(episodes[0].name, "Pilot");
        assert_eq!(episodes[1].id, 2);
        assert_eq!(episodes[1].name, "The Fire");
    }

    #[test]
    fn test_create_seasons() {
        let seasons =
            create_seasons(include_str!("../res/seasons.json")).expect("Failed to create seasons");

        assert_eq!(seasons.len(), 2);

        let season = &seasons[0];
        assert_eq!(season.id, 1);
        assert_eq!(season.number, 1);
        assert!(season.name.is_empty());
        assert_eq!(season.episode_order, Some(13));
        assert_eq!(
            season.premiere_date,
            Some(chrono::NaiveDate::from_ymd_opt(2013, 6, 24).unwrap())
        );
        assert_eq!(
            season.end_date,
            Some(chrono::NaiveDate::from_ymd_opt(2013, 9, 16).unwrap())
        );

        let network = season.network.as_ref().expect("Season has no network");
        assert_eq!(network.id, 2);
        assert_eq!(network.name, "CBS");
        let country = network.country.as_ref().expect("Network has no country");
        assert_eq!(country.code, "US");
        assert_eq!(country.timezone, "America/New_York");

        assert!(season.web_channel.is_none());
        assert_eq!(
            season.links[&LinkType::SelfLink].href,
            "http://api.tvmaze.com/seasons/1"
        );

        // second entry has null image, which folds to an empty map
        assert!(seasons[1].image.is_empty());
    }

    #[test]
    fn test_create_person_without_castcredits() {
        let person =
            create_person(include_str!("../res/person.json")).expect("Failed to create person");

        assert_eq!(person.id, 1);
        assert_eq!(person.url, "http://www.tvmaze.com/people/1/mike-vogel");
        assert_eq!(person.name, "Mike Vogel");
        assert_eq!(
            person.image[&ImageType::Medium],
            "http://tvmazecdn.com/uploads/images/medium_portrait/0/1815.jpg"
        );
        assert!(person.cast_credits.is_none());
    }

    #[test]
    fn test_create_person_with_castcredits() {
        let person = create_person(include_str!("../res/person_embed_castcredits.json"))
            .expect("Failed to create person");

        assert_eq!(person.id, 1);
        assert_eq!(person.name, "Mike Vogel");

        let credits = person.cast_credits.expect("Cast credits not attached");
        assert_eq!(credits.len(), 2);
        assert_eq!(
            credits[0].links[&LinkType::Show].href,
            "http://api.tvmaze.com/shows/1"
        );
        assert_eq!(
            credits[0].links[&LinkType::Character].href,
            "http://api.tvmaze.com/characters/1"
        );
    }

    #[test]
    fn test_create_show() {
        let show = create_show(include_str!("../res/show.json")).expect("Failed to create show");

        assert_eq!(show.id, 1);
        assert_eq!(show.url, "http://www.tvmaze.com/shows/1/under-the-dome");
        assert_eq!(show.name, "Under the Dome");
        assert_eq!(show.kind, "Scripted");
        assert_eq!(show.language.as_deref(), Some("English"));
        assert_eq!(show.genres, ["Drama", "Science-Fiction", "Thriller"]);
        assert_eq!(show.status, "Ended");
        assert_eq!(show.runtime, Some(60));
        assert_eq!(
            show.premiered,
            Some(chrono::NaiveDate::from_ymd_opt(2013, 6, 24).unwrap())
        );
        assert_eq!(show.schedule.time, "22:00");
        assert_eq!(show.schedule.days, ["Thursday"]);
        assert_eq!(show.rating.average, Some(6.6));
        assert_eq!(show.weight, 1);

        let network = show.network.as_ref().expect("Show has no network");
        assert_eq!(network.id, 2);
        assert_eq!(network.name, "CBS");
        assert!(show.web_channel.is_none());

        assert_eq!(show.externals["tvrage"], "25988");
        assert_eq!(show.externals["thetvdb"], "264492");
        assert_eq!(show.externals["imdb"], "tt1553656");

        assert_eq!(
            show.image[&ImageType::Medium],
            "http://tvmazecdn.com/uploads/images/medium_portrait/0/1.jpg"
        );
        assert_eq!(show.updated, 1467986681);
        assert_eq!(
            show.links[&LinkType::SelfLink].href,
            "http://api.tvmaze.com/shows/1"
        );
        assert_eq!(
            show.links[&LinkType::PreviousEpisode].href,
            "http://api.tvmaze.com/episodes/185054"
        );

        // no _embedded.cast key means absent, not empty
        assert!(show.casts.is_none());
        assert!(show.episodes.is_none());
    }

    #[test]
    fn test_create_show_with_embedded_cast() {
        let show = create_show(include_str!("../res/show_embed_cast.json"))
            .expect("Failed to create show");

        assert_eq!(show.id, 1);

        let casts = show.casts.expect("Cast not attached");
        assert_eq!(casts.len(), 2);
        assert_eq!(casts[0].person.name, "Mike Vogel");
        assert_eq!(casts[0].character.name, "Dale \"Barbie\" Barbara");
        assert!(!casts[0].is_self);
        assert!(!casts[0].voice);

        assert!(show.episodes.is_none());
    }

    #[test]
    fn test_create_show_with_embedded_episodes() {
        let show = create_show(include_str!("../res/show_embed_episodes.json"))
            .expect("Failed to create show");

        assert_eq!(show.id, 1);
        assert_eq!(show.updated, 1490211618);

        let episodes = show.episodes.expect("Episodes not attached");
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].name, "Pilot");
        assert_eq!(episodes[1].name, "The Fire");

        assert!(show.casts.is_none());
    }

    #[test]
    fn test_create_shows() {
        let shows = create_shows(include_str!("../res/shows.json")).expect("Failed to create shows");

        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].id, 1);
        assert_eq!(shows[0].name, "Under the Dome");
        assert_eq!(shows[0].weight, 2);
        assert_eq!(shows[0].updated, 1488136720);
        assert!(shows[0].casts.is_none());
        assert_eq!(shows[1].id, 2);
        assert_eq!(shows[1].name, "Person of Interest");
    }

    #[test]
    fn test_create_show_updates() {
        let updates = create_show_updates(include_str!("../res/show_updates.json"))
            .expect("Failed to create show updates");

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].show_id, "1");
        assert_eq!(updates[0].timestamp, 1488136720);

        let updated_at = updates[0].updated_at().expect("Timestamp out of range");
        assert_eq!(updated_at.to_rfc3339(), "2017-02-26T19:18:40+00:00");
    }

    #[test]
    fn test_create_show_updates_rejects_non_numeric_timestamp() {
        let res = create_show_updates(r#"{"1": "not-a-number"}"#);
        assert!(matches!(res, Err(FactoryError::Timestamp(id)) if id == "1"));
    }

    #[test]
    fn test_create_show_updates_accepts_numeric_values() {
        let updates =
            create_show_updates(r#"{"1": 1488136720}"#).expect("Failed to create show updates");
        assert_eq!(updates[0].timestamp, 1488136720);
    }

    #[test]
    fn test_create_people_search_results() {
        let results = create_people_search_results(include_str!("../res/search_people.json"))
            .expect("Failed to create search results");

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].score, 3.6249506);
        assert_eq!(results[1].element.id, 36952);
        assert_eq!(results[1].element.name, "Lauren Sweetser");
    }

    #[test]
    fn test_create_show_search_results() {
        let results = create_show_search_results(include_str!("../res/search_shows.json"))
            .expect("Failed to create search results");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].element.id, 1);
        assert_eq!(results[0].element.name, "Under the Dome");
        assert_eq!(results[1].element.id, 23161);
        assert_eq!(results[1].element.rating.average, None);
    }

    #[test]
    fn test_create_schedule() {
        let schedule = create_schedule(include_str!("../res/schedule.json"))
            .expect("Failed to create schedule");

        assert_eq!(schedule.episodes.len(), 2);

        let episode = &schedule.episodes[0];
        assert_eq!(episode.id, 220001);
        assert_eq!(episode.number, None);

        // schedule payloads carry the show inline
        let show = episode.show.as_ref().expect("Episode has no show");
        assert_eq!(show.id, 618);
        assert_eq!(show.name, "NFL Monday Night Football");
    }

    #[test]
    fn test_create_casts() {
        let casts = create_casts(include_str!("../res/cast.json")).expect("Failed to create casts");

        assert_eq!(casts.len(), 2);
        assert_eq!(casts[0].person.id, 1);
        assert_eq!(casts[0].person.name, "Mike Vogel");
        assert_eq!(casts[0].character.id, 1);
        assert_eq!(casts[1].person.name, "Rachelle Lefevre");
        assert_eq!(casts[1].character.name, "Julia Shumway");
    }

    #[test]
    fn test_create_crews() {
        let crews = create_crews(include_str!("../res/crew.json")).expect("Failed to create crews");

        assert_eq!(crews.len(), 2);
        assert_eq!(crews[0].kind, "Creator");
        assert_eq!(crews[0].person.name, "Brian K. Vaughan");
        assert_eq!(crews[1].kind, "Executive Producer");
        assert_eq!(crews[1].person.name, "Stephen King");
    }

    #[test]
    fn test_create_aliases() {
        let aliases =
            create_aliases(include_str!("../res/aliases.json")).expect("Failed to create aliases");

        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[0].name, "La cúpula");
        assert_eq!(
            aliases[0].country.as_ref().map(|c| c.code.as_str()),
            Some("ES")
        );
    }

    #[test]
    fn test_create_cast_credits_without_show() {
        let credits = create_cast_credits(include_str!("../res/cast_credits.json"))
            .expect("Failed to create cast credits");

        assert_eq!(credits.len(), 2);
        assert_eq!(
            credits[0].links[&LinkType::Show].href,
            "http://api.tvmaze.com/shows/1"
        );
        assert!(credits[0].show.is_none());
    }

    #[test]
    fn test_create_cast_credits_with_embedded_show() {
        let credits = create_cast_credits(include_str!("../res/cast_credits_embed_show.json"))
            .expect("Failed to create cast credits");

        assert_eq!(credits.len(), 1);
        let show = credits[0].show.as_ref().expect("Show not attached");
        assert_eq!(show.id, 1);
        assert_eq!(show.name, "Under the Dome");
    }

    #[test]
    fn test_create_crew_credits_without_show() {
        let credits = create_crew_credits(include_str!("../res/crew_credits.json"))
            .expect("Failed to create crew credits");

        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].kind, "Creator");
        assert_eq!(
            credits[0].links[&LinkType::Show].href,
            "http://api.tvmaze.com/shows/16"
        );
        assert!(credits[0].show.is_none());
    }

    #[test]
    fn test_create_crew_credits_with_embedded_show() {
        let credits = create_crew_credits(include_str!("../res/crew_credits_embed_show.json"))
            .expect("Failed to create crew credits");

        assert_eq!(credits.len(), 1);
        let show = credits[0].show.as_ref().expect("Show not attached");
        assert_eq!(show.id, 16);
        assert_eq!(show.name, "Penny Dreadful");
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(create_show(""), Err(FactoryError::EmptyInput)));
        assert!(matches!(create_episode("  "), Err(FactoryError::EmptyInput)));
        assert!(matches!(
            create_schedule("\n"),
            Err(FactoryError::EmptyInput)
        ));
        assert!(matches!(
            create_show_updates(""),
            Err(FactoryError::EmptyInput)
        ));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(matches!(
            create_show("{not json"),
            Err(FactoryError::Parse(_))
        ));
        assert!(matches!(
            create_episodes(r#"{"id": 1}"#),
            Err(FactoryError::Parse(_))
        ));
    }
}
