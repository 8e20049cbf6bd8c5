use crate::app_state::AppEvent;
use crate::chat::{ChatSession, ModelAlias, ProviderRouter};
use crate::commands::app_command::{nickname_list, HELP_TEXT};
use crate::commands::{AppCommand, TurnRequest};
use tokio::sync::mpsc;

/// Answers one turn on the bound session and reports back. History is untouched here;
/// the TUI appends both turns when it sees `Reply`.
pub async fn run_turn(
    session: &ChatSession,
    turn: TurnRequest,
    evt_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let started = std::time::Instant::now();
    match session
        .respond(&turn.history, &turn.message, &turn.config)
        .await
    {
        Ok(text) => {
            log::info!(
                "{} replied in {} ms ({} chars)",
                session.model_id(),
                started.elapsed().as_millis(),
                text.len()
            );
            let _ = evt_tx.send(AppEvent::Reply {
                epoch: turn.epoch,
                user: turn.message,
                text,
            });
        }
        Err(e) => {
            log::error!("{} request failed: {}", session.model_id(), e);
            let _ = evt_tx.send(AppEvent::Failed {
                epoch: turn.epoch,
                user: turn.message,
                error: e.to_string(),
                configuration: e.is_configuration(),
            });
        }
    }
}

/// Background task: owns the router and the bound session, handles commands one at a
/// time so a session never has two requests in flight.
pub async fn run_backend(
    router: ProviderRouter,
    initial: ModelAlias,
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let mut session = router.bind_alias(initial);
    let _ = evt_tx.send(AppEvent::Message(format!(
        "✓ bound {} -> {} ({})",
        initial.nickname(),
        initial.model_id(),
        initial.provider()
    )));

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            AppCommand::Send(turn) => {
                run_turn(&session, turn, &evt_tx).await;
            }
            AppCommand::SelectModel { nickname } => match router.bind(&nickname) {
                Ok(next) => {
                    let alias = next.alias();
                    session = next;
                    let _ = evt_tx.send(AppEvent::ModelBound(alias));
                }
                Err(e) => {
                    let _ = evt_tx.send(AppEvent::Error(format!("✗ {}", e)));
                }
            },
            AppCommand::ListModels => {
                for m in ModelAlias::ALL {
                    let _ = evt_tx.send(AppEvent::Message(format!(
                        "{:<9} {:<24} {}",
                        m.nickname(),
                        m.model_id(),
                        m.provider()
                    )));
                }
            }
            AppCommand::Help => {
                let _ = evt_tx.send(AppEvent::Message(HELP_TEXT.to_string()));
                let _ = evt_tx.send(AppEvent::Message(format!("models: {}", nickname_list())));
            }
            AppCommand::Unknown(msg) => {
                let _ = evt_tx.send(AppEvent::Error(format!("✗ {}", msg)));
            }
            local => {
                log::debug!("ignoring TUI-local command in backend: {:?}", local);
            }
        }
    }
    log::info!("command channel closed, backend stopping");
}
