use serde::{Deserialize, Serialize};

// ========================================================================
// Feed Envelope
// ========================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub results: Option<FeedResults>,
}

/// The home feed sections. Any section the upstream omits deserializes as
/// empty, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedResults {
    pub spotlights: Vec<AnimeSummary>,
    pub trending: Vec<AnimeSummary>,
    pub most_popular: Vec<AnimeSummary>,
    pub top_airing: Vec<AnimeSummary>,
    pub most_favorite: Vec<AnimeSummary>,
    pub latest_completed: Vec<AnimeSummary>,
    pub latest_episode: Vec<AnimeSummary>,
    pub today: TodayBlock,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TodayBlock {
    pub schedule: Vec<ScheduleEntry>,
}

// ========================================================================
// Search Envelope
// ========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub results: SearchResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub data: Vec<AnimeSummary>,
    #[serde(rename = "totalPage", default = "default_total_page")]
    pub total_page: u32,
}

fn default_success() -> bool {
    true
}

fn default_total_page() -> u32 {
    1
}

impl Default for SearchResults {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total_page: default_total_page(),
        }
    }
}

impl SearchEnvelope {
    /// Synthetic envelope with no hits: the empty-keyword short-circuit
    /// (`success: true`) and the degraded failure form (`success: false`).
    pub fn empty(success: bool) -> Self {
        Self {
            success,
            results: SearchResults::default(),
        }
    }
}

// ========================================================================
// Details Envelope
// ========================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetailsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Option<DetailsResults>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetailsResults {
    #[serde(default)]
    pub data: Option<AnimeDetails>,
}

// ========================================================================
// Entities
// ========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnimeSummary {
    pub id: String,
    pub data_id: i64,
    pub poster: String,
    pub title: String,
    pub japanese_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "tvInfo", skip_serializing_if = "Option::is_none")]
    pub tv_info: Option<TvInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TvInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnimeDetails {
    pub id: String,
    pub data_id: i64,
    pub poster: String,
    pub title: String,
    pub japanese_title: String,
    #[serde(rename = "adultContent")]
    pub adult_content: bool,
    #[serde(rename = "showType")]
    pub show_type: String,
    #[serde(rename = "animeInfo")]
    pub anime_info: AnimeInfo,
}

/// Free-form descriptive block of the details payload. The upstream keys
/// are display labels, hence the literal renames.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnimeInfo {
    #[serde(rename = "Overview", skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(rename = "Japanese", skip_serializing_if = "Option::is_none")]
    pub japanese: Option<String>,
    #[serde(rename = "Synonyms", skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
    #[serde(rename = "Aired", skip_serializing_if = "Option::is_none")]
    pub aired: Option<String>,
    #[serde(rename = "Premiered", skip_serializing_if = "Option::is_none")]
    pub premiered: Option<String>,
    #[serde(rename = "Duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "MAL Score", skip_serializing_if = "Option::is_none")]
    pub mal_score: Option<String>,
    #[serde(rename = "Genres")]
    pub genres: Vec<String>,
    #[serde(rename = "Studios", skip_serializing_if = "Option::is_none")]
    pub studios: Option<String>,
    #[serde(rename = "Producers")]
    pub producers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleEntry {
    pub id: String,
    pub data_id: i64,
    pub title: String,
    pub japanese_title: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub time: String,
    pub episode_no: u32,
}
