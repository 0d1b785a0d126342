//! The conversation-to-code turn protocol.
//!
//! `open_page` runs once per page load (attempt gate, then bootstrap on the
//! first load). `process_turn` runs once per submitted instruction. Both take
//! the session by `&mut` and write the persisted fields back to the store at
//! the end of every mutating step.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use appify_commands::{classify, CommandResult};
use appify_core::{
    AppifyError, ChatRole, ChatStore, GenerationRequest, MessageLog, ModelHistory, Notice, UserId,
    UserIdentity, DEFAULT_HISTORY_CAP,
};
use appify_generator::GeneratorRegistry;
use appify_logging::redact_sensitive_data;
use appify_materializer::{dedent, CodeMaterializer};

use crate::locale::{Locale, PLACEHOLDER_CODE};
use crate::report::{Download, PageView, TurnReport};
use crate::session::Session;

pub const DEFAULT_MAX_TRIES: u32 = 5;

const PROCESSING_HINT: &str = "Processing... Please keep this page open until the end of my response.";
const SECURITY_WARNING: &str = "Your instruction does not comply with our security measures (code generated will not be populated). See the docs for more information.";
const QUOTA_WARNING: &str = "You have exceeded the number of tries, please input your OpenAI API key to continue";
const QUOTA_DOWNLOAD_HINT: &str = "You can still download the app by clicking on the button below\nYou can then run it with `streamlit run streamlit_app.py`";
const NO_CODE_NOTICE: &str = "No code to download";

/// Tunables for the turn protocol.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub locale: Locale,
    /// Free generation turns before an API key is required.
    pub max_tries: u32,
    /// Past exchanges forwarded to the generator.
    pub history_cap: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            max_tries: DEFAULT_MAX_TRIES,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

pub struct ConversationController {
    store: Arc<dyn ChatStore>,
    generators: GeneratorRegistry,
    materializer: CodeMaterializer,
    settings: ChatSettings,
}

impl ConversationController {
    pub fn new(
        store: Arc<dyn ChatStore>,
        generators: GeneratorRegistry,
        script_path: impl Into<PathBuf>,
        settings: ChatSettings,
    ) -> Self {
        let materializer = CodeMaterializer::new(script_path, Arc::clone(&store));
        Self {
            store,
            generators,
            materializer,
            settings,
        }
    }

    pub fn new_session(&self, user: UserIdentity) -> Session {
        Session::new(user, self.settings.history_cap)
    }

    // -----------------------------------------------------------------------
    // Page load
    // -----------------------------------------------------------------------

    /// Handle a page load: attempt gate first, then bootstrap if needed.
    pub async fn open_page(&self, session: &mut Session) -> Result<PageView, AppifyError> {
        if !session.has_api_key() {
            let tries = self
                .store
                .get_tries(session.user.id)
                .await
                .map_err(AppifyError::storage)?;
            session.tries = Some(tries);

            if tries >= self.settings.max_tries {
                warn!(user_id = session.user.id, tries, "[Chat] Attempt quota exhausted");
                let download = self.download().await?;
                let mut notices = vec![Notice::warning(QUOTA_WARNING)];
                notices.push(match download {
                    Some(_) => Notice::info(QUOTA_DOWNLOAD_HINT),
                    None => Notice::warning(NO_CODE_NOTICE),
                });
                return Ok(PageView::QuotaExceeded { notices, download });
            }
        }

        if !session.is_bootstrapped() {
            self.bootstrap(session).await?;
        }

        Ok(PageView::Chat {
            messages: session.messages.entries().to_vec(),
        })
    }

    async fn bootstrap(&self, session: &mut Session) -> Result<(), AppifyError> {
        let user = session.user.id;
        let stored = self
            .store
            .get_message_history(user)
            .await
            .map_err(AppifyError::storage)?;

        session.history = ModelHistory::new(self.settings.history_cap);

        if stored.is_empty() {
            info!(user_id = user, "[Chat] No saved conversation, starting fresh");
            self.reset(session).await?;
        } else {
            debug!(user_id = user, messages = stored.len(), "[Chat] Replaying saved conversation");
            session.messages = stored;
            session.live_code = self
                .store
                .get_code(user)
                .await
                .map_err(AppifyError::storage)?
                .map(|code| dedent(&code));
        }

        if session.tries.is_none() {
            session.tries = Some(self.store.get_tries(user).await.map_err(AppifyError::storage)?);
        }

        session.mark_bootstrapped();
        info!(user_id = user, session_id = %session.id, "[Chat] Session ready");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Run one chat turn.
    ///
    /// On error the session is left as it was before the turn: the
    /// instruction is not kept in the display log, the live code and undo
    /// snapshot are unchanged, and nothing new reaches the model history. The
    /// one exception is the attempt counter, which is spent as soon as the
    /// generator answers.
    pub async fn process_turn(
        &self,
        session: &mut Session,
        instruction: &str,
    ) -> Result<TurnReport, AppifyError> {
        if !session.is_bootstrapped() {
            self.bootstrap(session).await?;
        }

        if !session.has_api_key() {
            let tries = session.tries.unwrap_or(0);
            if tries >= self.settings.max_tries {
                warn!(user_id = session.user.id, tries, "[Chat] Turn blocked until an API key is supplied");
                return Err(AppifyError::QuotaExceeded { tries });
            }
        }

        let pushed_id = session.messages.push(ChatRole::User, instruction).id.clone();

        let outcome = match classify(instruction, session.undo_snapshot.is_some()) {
            Some(command) => self.run_command(session, command).await,
            None => self.run_generation(session, instruction).await,
        };

        if outcome.is_err() && session.messages.last().is_some_and(|e| e.id == pushed_id) {
            session.messages.pop_last();
        }
        outcome
    }

    async fn run_command(
        &self,
        session: &mut Session,
        command: CommandResult,
    ) -> Result<TurnReport, AppifyError> {
        let user = session.user.id;
        if command.is_error() {
            warn!(user_id = user, ?command, "[Chat] Command rejected");
        } else {
            info!(user_id = user, ?command, "[Chat] Running command");
        }

        let mut report = TurnReport {
            notices: vec![command.notice()],
            ..Default::default()
        };

        // Staged copies; the session only changes once every store call succeeded.
        let mut messages = session.messages.clone();
        let mut history = session.history.clone();
        let mut reverted = None;

        match command {
            CommandResult::Unknown | CommandResult::NotUndo => {}
            CommandResult::Undo => {
                if let Some(snapshot) = session.undo_snapshot.clone() {
                    self.undo(session, &snapshot, &mut messages, &mut history).await?;
                    reverted = Some(snapshot);
                }
            }
            CommandResult::Reset => {
                // Reset leaves the greeting as the only message.
                self.reset(session).await?;
                report.tries_left = self.tries_left(session);
                return Ok(report);
            }
            CommandResult::Save => {
                report.download = self.download().await?;
                if report.download.is_none() {
                    report.notices.push(Notice::warning(NO_CODE_NOTICE));
                }
            }
        }

        messages.push(ChatRole::Assistant, command.message());
        if let Err(err) = self.persist(user, &messages).await {
            if reverted.is_some() {
                self.restore_code(user, session.live_code.as_deref()).await;
            }
            return Err(err);
        }

        session.messages = messages;
        session.history = history;
        if let Some(code) = reverted {
            session.live_code = Some(code);
            session.undo_snapshot = None;
            info!(user_id = user, "[Chat] Code reverted");
        }

        report.message = Some(command.message().to_string());
        report.tries_left = self.tries_left(session);
        Ok(report)
    }

    async fn run_generation(
        &self,
        session: &mut Session,
        instruction: &str,
    ) -> Result<TurnReport, AppifyError> {
        let user = session.user.id;
        let generator = self.generators.resolve(session.api_key.as_deref()).ok_or_else(|| {
            AppifyError::Config("no shared generator key configured; supply your own API key".into())
        })?;

        let request = GenerationRequest {
            instruction: instruction.to_string(),
            history: session.history.turns(),
            code: session.live_code.clone(),
        };

        info!(user_id = user, provider = generator.name(), "[Chat] {PROCESSING_HINT}");
        let result = generator.generate(&request).await.map_err(|e| {
            let message = redact_sensitive_data(&format!("{e:#}"));
            error!(user_id = user, provider = generator.name(), error = %message, "[Chat] Generation failed");
            AppifyError::Generation {
                provider: generator.name().to_string(),
                message,
            }
        })?;

        let mut report = TurnReport {
            progress: Some(PROCESSING_HINT.to_string()),
            ..Default::default()
        };

        // The attempt counts as soon as the generator has answered, before any
        // code is applied.
        if !session.has_api_key() {
            let tries = self
                .store
                .increment_tries(user)
                .await
                .map_err(AppifyError::storage)?;
            session.tries = Some(tries);
            report
                .notices
                .push(tries_notice(self.settings.max_tries.saturating_sub(tries)));
        }

        let mut message = String::new();
        if let Some(code) = &result.code {
            message.push_str(&format!("```python\n{code}\n```\n"));
        }
        message.push_str(&result.explanation);

        let applied = match result.code {
            Some(code) if !result.revision_request => Some(code),
            _ => None,
        };
        if result.revision_request {
            warn!(user_id = user, "[Chat] Instruction rejected by safety rules, code withheld");
            report.notices.push(Notice::warning(SECURITY_WARNING));
        }

        let mut messages = session.messages.clone();
        messages.push(ChatRole::Assistant, message.clone());
        let mut history = session.history.clone();
        history.push(instruction, result.explanation);

        if let Some(code) = &applied {
            self.apply_code(user, code, session.live_code.as_deref()).await?;
        }
        if let Err(err) = self.persist(user, &messages).await {
            if applied.is_some() {
                self.restore_code(user, session.live_code.as_deref()).await;
            }
            return Err(err);
        }

        session.messages = messages;
        session.history = history;
        if let Some(code) = applied {
            let previous = session.live_code.replace(code);
            session.undo_snapshot = Some(previous.unwrap_or_else(|| PLACEHOLDER_CODE.to_string()));
        }

        report.message = Some(message);
        report.tries_left = self.tries_left(session);
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn reset(&self, session: &mut Session) -> Result<(), AppifyError> {
        let user = session.user.id;
        let greeting = MessageLog::seeded(self.settings.locale.greeting(&session.user.name));

        self.apply_code(user, PLACEHOLDER_CODE, session.live_code.as_deref()).await?;
        if let Err(err) = self.persist(user, &greeting).await {
            self.restore_code(user, session.live_code.as_deref()).await;
            return Err(err);
        }

        session.messages = greeting;
        session.history.clear();
        session.live_code = Some(PLACEHOLDER_CODE.to_string());
        session.undo_snapshot = None;

        info!(user_id = user, "[Chat] Conversation reset");
        Ok(())
    }

    /// Re-apply `snapshot` and drop the undone exchange from the staged log
    /// and history.
    ///
    /// Only the assistant reply to the undone instruction leaves the display
    /// log. The instruction itself stays visible above the `/undo`.
    async fn undo(
        &self,
        session: &Session,
        snapshot: &str,
        messages: &mut MessageLog,
        history: &mut ModelHistory,
    ) -> Result<(), AppifyError> {
        self.apply_code(session.user.id, snapshot, session.live_code.as_deref())
            .await?;
        // The newest entry is the `/undo` itself.
        messages.remove_from_end(1);
        history.pop_latest();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Code
    // -----------------------------------------------------------------------

    /// Make `code` live, putting `previous` back if the apply fails halfway.
    async fn apply_code(
        &self,
        user: UserId,
        code: &str,
        previous: Option<&str>,
    ) -> Result<(), AppifyError> {
        if let Err(err) = self.materializer.apply(user, Some(code)).await {
            self.restore_code(user, previous).await;
            return Err(AppifyError::materialize(err));
        }
        Ok(())
    }

    /// Best-effort rollback of the live code after a failed turn.
    async fn restore_code(&self, user: UserId, previous: Option<&str>) {
        let Some(previous) = previous else {
            return;
        };
        if let Err(err) = self.materializer.apply(user, Some(previous)).await {
            error!(user_id = user, error = %format!("{err:#}"), "[Chat] Could not restore previous code");
        } else {
            warn!(user_id = user, "[Chat] Turn failed, previous code restored");
        }
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    /// Store a user-supplied API key for the rest of the session.
    pub fn set_api_key(&self, session: &mut Session, api_key: &str) -> Result<(), AppifyError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppifyError::Config("API key must not be empty".into()));
        }
        session.api_key = Some(api_key.to_string());
        info!(user_id = session.user.id, "[Chat] API key override set");
        Ok(())
    }

    /// The live app as a download, or `None` when no code has been applied.
    pub async fn download(&self) -> Result<Option<Download>, AppifyError> {
        let code = self
            .materializer
            .read_live_code()
            .await
            .map_err(AppifyError::materialize)?;
        Ok(code.map(Download::python_app))
    }

    fn tries_left(&self, session: &Session) -> Option<u32> {
        if session.has_api_key() {
            return None;
        }
        Some(self.settings.max_tries.saturating_sub(session.tries.unwrap_or(0)))
    }

    async fn persist(&self, user: UserId, messages: &MessageLog) -> Result<(), AppifyError> {
        self.store
            .set_message_history(user, messages)
            .await
            .map_err(AppifyError::storage)
    }
}

fn tries_notice(left: u32) -> Notice {
    match left {
        0 => Notice::error("You have 0 try left."),
        1 => Notice::warning("You have 1 try left."),
        n => Notice::info(format!("You have {n} tries left.")),
    }
}
