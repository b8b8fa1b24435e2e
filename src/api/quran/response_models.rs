// alquran.cloud payload shapes used by the content client.
#[derive(Debug, Deserialize)]
pub struct WireAyah {
    pub number: u32,
    #[serde(default)]
    pub text: String,
    #[serde(alias = "numberInSurah")]
    pub number_in_surah: u16,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub surah: Option<SurahSummary>,
    #[serde(default)]
    pub page: Option<u16>,
    #[serde(default)]
    pub juz: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct WirePage {
    #[allow(dead_code)]
    pub number: u16,
    #[serde(default)]
    pub ayahs: Vec<WireAyah>,
}

#[derive(Debug, Deserialize)]
pub struct WireSurah {
    #[serde(flatten)]
    pub summary: SurahSummary,
    #[serde(default)]
    pub ayahs: Vec<WireAyah>,
}
