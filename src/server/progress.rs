use tower_lsp::Client;
use tower_lsp::lsp_types::notification;
use tower_lsp::lsp_types::*;

/// `$/progress` による作業進捗の通知
pub struct Progress<'a> {
    client: &'a Client,
    token: NumberOrString,
}

impl<'a> Progress<'a> {
    /// トークンを作成して開始を通知
    pub async fn begin(client: &'a Client, token_name: &str, title: &str, message: String) -> Self {
        let token = NumberOrString::String(token_name.to_string());
        let _ = client
            .send_request::<request::WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                token: token.clone(),
            })
            .await;

        let progress = Self { client, token };
        progress
            .send(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: title.to_string(),
                cancellable: Some(false),
                message: Some(message),
                percentage: None,
            }))
            .await;
        progress
    }

    pub async fn report(&self, message: String) {
        self.send(WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(false),
            message: Some(message),
            percentage: None,
        }))
        .await;
    }

    pub async fn end(self, message: String) {
        self.send(WorkDoneProgress::End(WorkDoneProgressEnd {
            message: Some(message),
        }))
        .await;
    }

    async fn send(&self, value: WorkDoneProgress) {
        self.client
            .send_notification::<notification::Progress>(ProgressParams {
                token: self.token.clone(),
                value: ProgressParamsValue::WorkDone(value),
            })
            .await;
    }
}
