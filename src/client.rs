use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::domain::{
    Alias, Cast, CastCredit, Crew, CrewCredit, EmbedType, Episode, ExternalTvShowProvider, Person,
    Schedule, SearchResult, Season, Show, ShowUpdate,
};
use crate::factory::{self, FactoryError};
use crate::transport::{HttpTransport, IsahcTransport, TransportError};

const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("required argument {0} is empty")]
    EmptyArgument(&'static str),
    #[error("failed to execute get")]
    Transport(#[from] TransportError),
    #[error("server returned status {0}")]
    Http(u16),
    #[error("failed to map response body")]
    Factory(#[from] FactoryError),
}

impl ApiError {
    /// Status code carried by the error, when the server answered at all.
    /// Paged endpoints signal end-of-data with a 404, so callers iterating
    /// pages branch on this.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(status) => Some(*status),
            _ => None,
        }
    }
}

fn require(name: &'static str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::EmptyArgument(name));
    }
    Ok(())
}

fn query_string(params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();

    format!("?{}", parts.join("&"))
}

/// Client for the TVMaze REST API. Every operation comes in an async flavor
/// and a `_blocking` wrapper that drives the async one to completion; the
/// async methods are the source of truth. The client holds no mutable state,
/// so one instance can serve concurrent calls as long as the transport can.
pub struct TvMazeClient<T> {
    base_url: String,
    transport: T,
}

impl TvMazeClient<IsahcTransport> {
    /// Client against the production API root.
    pub fn new() -> Self {
        Self::with_transport(IsahcTransport)
    }
}

impl Default for TvMazeClient<IsahcTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HttpTransport> TvMazeClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, transport)
    }

    pub fn with_base_url(base_url: impl Into<String>, transport: T) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        TvMazeClient {
            base_url,
            transport,
        }
    }

    async fn fetch(&self, path_and_query: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!("sending request to {url}");

        let response = self.transport.get(&url).await?;
        debug!("got status {} from {url}", response.status);

        if !(200..300).contains(&response.status) {
            return Err(ApiError::Http(response.status));
        }

        Ok(response.body)
    }

    /// Primary information for a person, optionally with an embedded
    /// sub-resource.
    pub async fn person_info(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Person, ApiError> {
        require("person_id", person_id)?;

        let mut params = Vec::new();
        if let Some(embed) = embed {
            params.push(("embed", embed.as_str().to_string()));
        }

        let path = format!(
            "/people/{}{}",
            urlencoding::encode(person_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_person(&body)?)
    }

    pub fn person_info_blocking(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Person, ApiError> {
        futures::executor::block_on(self.person_info(person_id, embed))
    }

    /// Cast credits for a person; each credit pairs a show with a character.
    pub async fn cast_credits(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Vec<CastCredit>, ApiError> {
        require("person_id", person_id)?;

        let mut params = Vec::new();
        if let Some(embed) = embed {
            params.push(("embed", embed.as_str().to_string()));
        }

        let path = format!(
            "/people/{}/castcredits{}",
            urlencoding::encode(person_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_cast_credits(&body)?)
    }

    pub fn cast_credits_blocking(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Vec<CastCredit>, ApiError> {
        futures::executor::block_on(self.cast_credits(person_id, embed))
    }

    /// Crew credits for a person; each credit pairs a show with a role.
    pub async fn crew_credits(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Vec<CrewCredit>, ApiError> {
        require("person_id", person_id)?;

        let mut params = Vec::new();
        if let Some(embed) = embed {
            params.push(("embed", embed.as_str().to_string()));
        }

        let path = format!(
            "/people/{}/crewcredits{}",
            urlencoding::encode(person_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_crew_credits(&body)?)
    }

    pub fn crew_credits_blocking(
        &self,
        person_id: &str,
        embed: Option<EmbedType>,
    ) -> Result<Vec<CrewCredit>, ApiError> {
        futures::executor::block_on(self.crew_credits(person_id, embed))
    }

    /// Episodes airing in a country on a date. The server defaults to the US
    /// and the current day when the parameters are omitted.
    pub async fn schedule(
        &self,
        country_code: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Schedule, ApiError> {
        let mut params = Vec::new();
        if let Some(country_code) = country_code {
            params.push(("country", country_code.to_string()));
        }
        if let Some(date) = date {
            params.push(("date", date.format(DATE_FORMAT).to_string()));
        }

        let path = format!("/schedule{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_schedule(&body)?)
    }

    pub fn schedule_blocking(
        &self,
        country_code: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Schedule, ApiError> {
        futures::executor::block_on(self.schedule(country_code, date))
    }

    /// Every future episode known to the service, regardless of country.
    pub async fn full_schedule(&self) -> Result<Schedule, ApiError> {
        let body = self.fetch("/schedule/full").await?;
        Ok(factory::create_schedule(&body)?)
    }

    pub fn full_schedule_blocking(&self) -> Result<Schedule, ApiError> {
        futures::executor::block_on(self.full_schedule())
    }

    /// Full-text show search, scored by relevance.
    pub async fn search_shows(&self, query: &str) -> Result<Vec<SearchResult<Show>>, ApiError> {
        require("query", query)?;

        let params = [("q", query.to_string())];
        let path = format!("/search/shows{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_show_search_results(&body)?)
    }

    pub fn search_shows_blocking(&self, query: &str) -> Result<Vec<SearchResult<Show>>, ApiError> {
        futures::executor::block_on(self.search_shows(query))
    }

    /// Like [`Self::search_shows`] but the server picks the single best
    /// match, or answers 404 when nothing fits.
    pub async fn single_search_show(
        &self,
        query: &str,
        embed: Option<EmbedType>,
    ) -> Result<Show, ApiError> {
        require("query", query)?;

        let mut params = vec![("q", query.to_string())];
        if let Some(embed) = embed {
            params.push(("embed", embed.as_str().to_string()));
        }

        let path = format!("/singlesearch/shows{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_show(&body)?)
    }

    pub fn single_search_show_blocking(
        &self,
        query: &str,
        embed: Option<EmbedType>,
    ) -> Result<Show, ApiError> {
        futures::executor::block_on(self.single_search_show(query, embed))
    }

    /// Find a show by an external database id. The provider's wire string is
    /// the query parameter name, e.g. `/lookup/shows?thetvdb=264492`.
    pub async fn lookup_show(
        &self,
        show_id: &str,
        provider: ExternalTvShowProvider,
    ) -> Result<Show, ApiError> {
        require("show_id", show_id)?;

        let params = [(provider.as_str(), show_id.to_string())];
        let path = format!("/lookup/shows{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_show(&body)?)
    }

    pub fn lookup_show_blocking(
        &self,
        show_id: &str,
        provider: ExternalTvShowProvider,
    ) -> Result<Show, ApiError> {
        futures::executor::block_on(self.lookup_show(show_id, provider))
    }

    /// Full-text people search, scored by relevance.
    pub async fn search_people(&self, query: &str) -> Result<Vec<SearchResult<Person>>, ApiError> {
        require("query", query)?;

        let params = [("q", query.to_string())];
        let path = format!("/search/people{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_people_search_results(&body)?)
    }

    pub fn search_people_blocking(
        &self,
        query: &str,
    ) -> Result<Vec<SearchResult<Person>>, ApiError> {
        futures::executor::block_on(self.search_people(query))
    }

    /// Primary information for a show, optionally with an embedded
    /// sub-resource (cast or episodes).
    pub async fn show(&self, show_id: &str, embed: Option<EmbedType>) -> Result<Show, ApiError> {
        require("show_id", show_id)?;

        let mut params = Vec::new();
        if let Some(embed) = embed {
            params.push(("embed", embed.as_str().to_string()));
        }

        let path = format!(
            "/shows/{}{}",
            urlencoding::encode(show_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_show(&body)?)
    }

    pub fn show_blocking(&self, show_id: &str, embed: Option<EmbedType>) -> Result<Show, ApiError> {
        futures::executor::block_on(self.show(show_id, embed))
    }

    /// Complete episode list for a show in airing order. Specials are left
    /// out unless `specials` is true.
    pub async fn episodes(&self, show_id: &str, specials: bool) -> Result<Vec<Episode>, ApiError> {
        require("show_id", show_id)?;

        let mut params = Vec::new();
        if specials {
            params.push(("specials", "1".to_string()));
        }

        let path = format!(
            "/shows/{}/episodes{}",
            urlencoding::encode(show_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_episodes(&body)?)
    }

    pub fn episodes_blocking(
        &self,
        show_id: &str,
        specials: bool,
    ) -> Result<Vec<Episode>, ApiError> {
        futures::executor::block_on(self.episodes(show_id, specials))
    }

    /// One episode of a show by season and episode number.
    pub async fn episode_by_number(
        &self,
        show_id: &str,
        season: u32,
        number: u32,
    ) -> Result<Episode, ApiError> {
        require("show_id", show_id)?;

        let params = [
            ("season", season.to_string()),
            ("number", number.to_string()),
        ];
        let path = format!(
            "/shows/{}/episodebynumber{}",
            urlencoding::encode(show_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_episode(&body)?)
    }

    pub fn episode_by_number_blocking(
        &self,
        show_id: &str,
        season: u32,
        number: u32,
    ) -> Result<Episode, ApiError> {
        futures::executor::block_on(self.episode_by_number(show_id, season, number))
    }

    /// All episodes of a show that aired on a specific date.
    pub async fn episodes_by_date(
        &self,
        show_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Episode>, ApiError> {
        require("show_id", show_id)?;

        let params = [("date", date.format(DATE_FORMAT).to_string())];
        let path = format!(
            "/shows/{}/episodesbydate{}",
            urlencoding::encode(show_id),
            query_string(&params)
        );
        let body = self.fetch(&path).await?;
        Ok(factory::create_episodes(&body)?)
    }

    pub fn episodes_by_date_blocking(
        &self,
        show_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Episode>, ApiError> {
        futures::executor::block_on(self.episodes_by_date(show_id, date))
    }

    /// Season list for a show in ascending order.
    pub async fn seasons(&self, show_id: &str) -> Result<Vec<Season>, ApiError> {
        require("show_id", show_id)?;

        let path = format!("/shows/{}/seasons", urlencoding::encode(show_id));
        let body = self.fetch(&path).await?;
        Ok(factory::create_seasons(&body)?)
    }

    pub fn seasons_blocking(&self, show_id: &str) -> Result<Vec<Season>, ApiError> {
        futures::executor::block_on(self.seasons(show_id))
    }

    /// Main cast of a show, ordered by importance.
    pub async fn cast(&self, show_id: &str) -> Result<Vec<Cast>, ApiError> {
        require("show_id", show_id)?;

        let path = format!("/shows/{}/cast", urlencoding::encode(show_id));
        let body = self.fetch(&path).await?;
        Ok(factory::create_casts(&body)?)
    }

    pub fn cast_blocking(&self, show_id: &str) -> Result<Vec<Cast>, ApiError> {
        futures::executor::block_on(self.cast(show_id))
    }

    /// Main crew of a show.
    pub async fn crew(&self, show_id: &str) -> Result<Vec<Crew>, ApiError> {
        require("show_id", show_id)?;

        let path = format!("/shows/{}/crew", urlencoding::encode(show_id));
        let body = self.fetch(&path).await?;
        Ok(factory::create_crews(&body)?)
    }

    pub fn crew_blocking(&self, show_id: &str) -> Result<Vec<Crew>, ApiError> {
        futures::executor::block_on(self.crew(show_id))
    }

    /// Alternate titles of a show.
    pub async fn aliases(&self, show_id: &str) -> Result<Vec<Alias>, ApiError> {
        require("show_id", show_id)?;

        let path = format!("/shows/{}/akas", urlencoding::encode(show_id));
        let body = self.fetch(&path).await?;
        Ok(factory::create_aliases(&body)?)
    }

    pub fn aliases_blocking(&self, show_id: &str) -> Result<Vec<Alias>, ApiError> {
        futures::executor::block_on(self.aliases(show_id))
    }

    /// One page of the full show index, 250 shows per page keyed by id.
    /// The end of the index is a 404 response, surfaced as
    /// `ApiError::Http(404)`; there is no automatic continuation.
    pub async fn shows(&self, page: Option<u64>) -> Result<Vec<Show>, ApiError> {
        let mut params = Vec::new();
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }

        let path = format!("/shows{}", query_string(&params));
        let body = self.fetch(&path).await?;
        Ok(factory::create_shows(&body)?)
    }

    pub fn shows_blocking(&self, page: Option<u64>) -> Result<Vec<Show>, ApiError> {
        futures::executor::block_on(self.shows(page))
    }

    /// All shows paired with the unix time they were last updated.
    pub async fn show_updates(&self) -> Result<Vec<ShowUpdate>, ApiError> {
        let body = self.fetch("/updates/shows").await?;
        Ok(factory::create_show_updates(&body)?)
    }

    pub fn show_updates_blocking(&self) -> Result<Vec<ShowUpdate>, ApiError> {
        futures::executor::block_on(self.show_updates())
    }
}
