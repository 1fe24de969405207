use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::analysis_export;
use crate::analysis_fetch;
use crate::state::{AnalysisResult, Delta, ProviderCommand};

/// Blocking provider backed by the remote analysis service. Owns the network
/// side of the request/response cycle; the UI thread only ever sees deltas.
pub fn spawn_http_provider(
    base_url: String,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchAccounts => {
                    match analysis_fetch::fetch_accounts(&base_url) {
                        Ok(accounts) => {
                            let _ = tx.send(Delta::SetAccounts(accounts));
                        }
                        Err(err) => {
                            let _ = tx.send(Delta::AccountsFailed(err.to_string()));
                        }
                    }
                }
                ProviderCommand::FetchAnalysis {
                    account_id,
                    pattern,
                } => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Fetching analysis for {account_id} ({pattern})"
                    )));
                    match analysis_fetch::fetch_analysis(&base_url, &account_id, &pattern) {
                        Ok(result) => {
                            let _ = tx.send(Delta::SetAnalysis {
                                account_id,
                                result: Box::new(result),
                            });
                        }
                        Err(err) => {
                            let _ = tx.send(Delta::AnalysisFailed {
                                account_id,
                                error: err.to_string(),
                            });
                        }
                    }
                }
                ProviderCommand::ExportAnalysis { path, result } => {
                    run_export(&tx, &path, &result);
                }
            }
        }
    });
}

/// Shared by both providers: export runs on the provider thread so workbook
/// IO never blocks a frame.
pub(crate) fn run_export(tx: &Sender<Delta>, path: &str, result: &AnalysisResult) {
    let _ = tx.send(Delta::ExportStarted {
        path: path.to_string(),
    });
    match analysis_export::write_analysis_workbook(path, result) {
        Ok(rows) => {
            let _ = tx.send(Delta::ExportFinished {
                path: path.to_string(),
                rows,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::ExportFailed(format!("{err:#}")));
        }
    }
}
