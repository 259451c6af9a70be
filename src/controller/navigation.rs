//! Navigation between the surah list and surah detail views

use crate::model::parse_surah_number;
use super::AppController;

impl AppController {
    pub async fn load_surah_list(&self) {
        tracing::debug!("Loading surah list");
        let model = self.model.lock().await;
        let route = model.begin_route().await;
        let Some(client) = model.get_client().await else {
            return;
        };
        drop(model);

        let result = client.list_surahs().await;

        let model = self.model.lock().await;
        match result {
            Ok(surahs) => {
                tracing::info!(count = surahs.len(), "Surah list loaded");
                model.set_surah_list(route, surahs).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Surah list failed");
                model.set_failed(route).await;
            }
        }
    }

    /// Open a surah from its raw number. Invalid numbers show "not found" without a request.
    pub async fn open_surah(&self, raw_number: Option<&str>) {
        let model = self.model.lock().await;
        let route = model.begin_route().await;

        let number = match parse_surah_number(raw_number) {
            Ok(number) => number,
            Err(e) => {
                tracing::warn!(error = %e, "Not opening surah");
                model.set_not_found(route).await;
                return;
            }
        };
        let Some(client) = model.get_client().await else {
            return;
        };
        drop(model);

        tracing::debug!(number, "Opening surah");
        let result = client.get_surah_detail(number).await;

        let model = self.model.lock().await;
        match result {
            Ok(detail) => {
                tracing::info!(number, verses = detail.ayahs.len(), "Surah loaded");
                model.set_surah_detail(route, detail).await;
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(number, error = %e, "Surah not found");
                model.set_not_found(route).await;
            }
            Err(e) => {
                tracing::error!(number, error = %e, "Surah detail failed");
                model.set_failed(route).await;
            }
        }
    }

    pub async fn open_selected_surah(&self) {
        let selected = self.model.lock().await.get_selected_surah_number().await;
        if let Some(number) = selected {
            self.open_surah(Some(number.to_string().as_str())).await;
        }
    }

    /// Back action of the navbar: stop playback and return to the list
    pub async fn navigate_back(&self) {
        let (commands, needs_list) = self.model.lock().await.navigate_back().await;
        self.dispatch(commands).await;
        if needs_list {
            self.load_surah_list().await;
        }
    }
}
