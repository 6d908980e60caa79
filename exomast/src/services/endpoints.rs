//! URL construction for every exoMAST endpoint

use crate::models::{Collection, MissionId};
use exomast_common::config::ServiceSettings;

/// Versioned API root plus the endpoint path templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// `api_url` without version, e.g. `https://exo.mast.stsci.edu/api`
    pub fn new(api_url: &str, api_version: &str) -> Self {
        Self {
            base: format!("{}/v{}", api_url.trim_end_matches('/'), api_version),
        }
    }

    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self {
            base: settings.api_base(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn identifiers(&self, url_name: &str) -> String {
        format!("{}/exoplanets/identifiers/?name={}", self.base, url_name)
    }

    pub fn properties(&self, url_name: &str) -> String {
        format!("{}/exoplanets/{}/properties", self.base, url_name)
    }

    pub fn spectrum_filelist(&self, url_name: &str) -> String {
        format!("{}/spectra/{}/filelist/", self.base, url_name)
    }

    pub fn spectrum_file(&self, url_name: &str, filename: &str) -> String {
        format!(
            "{}/spectra/{}/file/{}",
            self.base,
            url_name,
            urlencoding::encode(filename)
        )
    }

    pub fn spectrum_plot(&self, url_name: &str) -> String {
        format!("{}/spectra/{}/plot/", self.base, url_name)
    }

    pub fn tce(&self, collection: Collection, mission_id: &MissionId) -> String {
        format!("{}/tces/", self.dvdata(collection, mission_id))
    }

    /// Collection-level info when no mission id is known
    pub fn collection_info(&self, collection: Collection) -> String {
        format!(
            "{}/dvdata/{}/info",
            self.base,
            collection.path_segment().unwrap_or_default()
        )
    }

    pub fn metadata(&self, collection: Collection, mission_id: &MissionId, tce_index: u32) -> String {
        format!("{}/info/?tce={}", self.dvdata(collection, mission_id), tce_index)
    }

    pub fn detrended_table(&self, collection: Collection, mission_id: &MissionId, tce_index: u32) -> String {
        format!("{}/table/?tce={}", self.dvdata(collection, mission_id), tce_index)
    }

    pub fn phase_plot(
        &self,
        collection: Collection,
        mission_id: &MissionId,
        tce_index: u32,
        embed: bool,
    ) -> String {
        let url = format!("{}/phaseplot/?tce={}", self.dvdata(collection, mission_id), tce_index);
        if embed {
            format!("{}&embed", url)
        } else {
            url
        }
    }

    fn dvdata(&self, collection: Collection, mission_id: &MissionId) -> String {
        format!(
            "{}/dvdata/{}/{}",
            self.base,
            collection.path_segment().unwrap_or_default(),
            urlencoding::encode(&mission_id.to_string())
        )
    }
}
