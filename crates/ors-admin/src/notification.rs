//! Admin notification form.
//!
//! [`NotificationController`] owns the form state for the three send modes
//! and the role list loaded from the backend. Validation happens locally;
//! anything that passes goes through the [`RequestDispatcher`] and the
//! resulting envelope is folded back into `error` / `message` / `loading`.

use std::sync::Arc;

use indexmap::IndexSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::dispatcher::{Outcome, RequestDispatcher};
use crate::envelope::{Envelope, is_success, result_field, result_message};
use crate::error::ClientError;
use crate::store::FCM_TOKEN;

const SEND_TEST: &str = "AdminNotification/sendTest";
const BROADCAST: &str = "AdminNotification/broadcast";
const PRELOAD: &str = "AdminNotification/preload";
const SEND_TO_ROLES: &str = "AdminNotification/sendToRoles";
const INFO: &str = "AdminNotification";

const MISSING_CONTENT: &str = "Title and Body are required";
const MISSING_TOKEN: &str = "FCM Token is required for test notification";
const MISSING_ROLES: &str = "Please select at least one role to send notification";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    #[default]
    Test,
    RoleBased,
    Broadcast,
}

/// User-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub body: String,
    pub fcm_token: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub selected_roles: IndexSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub data: NotificationDraft,
    pub error: bool,
    pub message: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleNotificationRequest<'a> {
    title: &'a str,
    body: &'a str,
    selected_roles: Vec<&'a str>,
}

pub struct NotificationController {
    dispatcher: Arc<RequestDispatcher>,
    form: FormState,
    available_roles: Vec<Value>,
    roles_loading: bool,
}

impl NotificationController {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            dispatcher,
            form: FormState::default(),
            available_roles: Vec::new(),
            roles_loading: false,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn draft_mut(&mut self) -> &mut NotificationDraft {
        &mut self.form.data
    }

    pub fn available_roles(&self) -> &[Value] {
        &self.available_roles
    }

    pub fn roles_loading(&self) -> bool {
        self.roles_loading
    }

    /// Initialise the form: delivery token first, then the role list.
    pub async fn mount(&mut self) {
        self.ensure_fcm_token();
        self.load_available_roles().await;
    }

    /// Load the delivery token from the store, generating a placeholder if
    /// none is stored.
    ///
    /// The placeholder is not a deliverable credential; it only lets the
    /// test-send path be exercised without a registered device.
    pub fn ensure_fcm_token(&mut self) -> &str {
        let store = self.dispatcher.session().store();
        let token = match store.get(FCM_TOKEN).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                let token = placeholder_token();
                debug!(token = %token, "generated placeholder delivery token");
                if let Err(e) = store.set(FCM_TOKEN, &token) {
                    warn!(error = %e, "could not persist placeholder delivery token");
                }
                token
            }
        };
        self.form.data.fcm_token = token;
        &self.form.data.fcm_token
    }

    pub async fn load_available_roles(&mut self) {
        self.roles_loading = true;
        let outcome = match self.dispatcher.endpoint_url(PRELOAD, &[]) {
            Ok(url) => self.dispatcher.read(&url).await,
            Err(e) => {
                error!(error = %e, "invalid preload endpoint");
                Outcome::Completed(Value::Null)
            }
        };
        self.roles_loading = false;

        let Outcome::Completed(res) = outcome else {
            self.available_roles.clear();
            return;
        };
        match result_field(&res, "roleList").and_then(Value::as_array) {
            Some(list) if is_success(&res) => {
                info!(count = list.len(), "loaded roles");
                self.available_roles = list.clone();
            }
            _ => {
                error!(message = ?result_message(&res), "failed to load roles");
                self.available_roles.clear();
            }
        }
    }

    pub fn set_role_selected(&mut self, role_id: &str, selected: bool) {
        let roles = &mut self.form.data.selected_roles;
        if selected {
            roles.insert(role_id.to_string());
        } else {
            roles.shift_remove(role_id);
        }
        debug!(selected = ?roles, "role selection changed");
    }

    pub fn is_role_selected(&self, role_id: &str) -> bool {
        self.form.data.selected_roles.contains(role_id)
    }

    pub async fn submit(&mut self) {
        match self.form.data.kind {
            NotificationKind::Test => self.send_test().await,
            NotificationKind::RoleBased => self.send_role_based().await,
            NotificationKind::Broadcast => self.send_broadcast().await,
        }
    }

    pub async fn send_test(&mut self) {
        if !self.require_content() {
            return;
        }
        if self.form.data.fcm_token.is_empty() {
            self.fail(MISSING_TOKEN);
            return;
        }

        let data = &self.form.data;
        let url = self.dispatcher.endpoint_url(
            SEND_TEST,
            &[
                ("fcmToken", data.fcm_token.as_str()),
                ("title", data.title.as_str()),
                ("body", data.body.as_str()),
            ],
        );
        let fallback = "Failed to send notification";
        self.dispatch_read(url, fallback, |_| "Test notification sent successfully!".to_string())
            .await;
    }

    pub async fn send_broadcast(&mut self) {
        if !self.require_content() {
            return;
        }

        let data = &self.form.data;
        let url = self.dispatcher.endpoint_url(
            BROADCAST,
            &[("title", data.title.as_str()), ("body", data.body.as_str())],
        );
        let fallback = "Failed to send broadcast notification";
        self.dispatch_read(url, fallback, |_| {
            "Broadcast notification sent successfully!".to_string()
        })
        .await;
    }

    pub async fn send_role_based(&mut self) {
        if !self.require_content() {
            return;
        }
        if self.form.data.selected_roles.is_empty() {
            self.fail(MISSING_ROLES);
            return;
        }

        let body = {
            let data = &self.form.data;
            let request = RoleNotificationRequest {
                title: &data.title,
                body: &data.body,
                selected_roles: data.selected_roles.iter().map(String::as_str).collect(),
            };
            info!(roles = ?request.selected_roles, "sending role-based notification");
            serde_json::to_value(&request)
        };
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                self.fail(&e.to_string());
                return;
            }
        };
        let url = match self.dispatcher.endpoint_url(SEND_TO_ROLES, &[]) {
            Ok(url) => url,
            Err(e) => {
                self.fail(&e.to_string());
                return;
            }
        };

        self.begin();
        let outcome = self.dispatcher.write(&url, &body).await;
        let fallback = "Failed to send role-based notification";
        self.finish(outcome, fallback, |res| {
            let sent: Vec<String> = result_field(res, "sentToRoles")
                .and_then(Value::as_array)
                .map(|roles| roles.iter().map(display_role).collect())
                .unwrap_or_default();
            format!(
                "Role-based notification sent successfully to: {}!",
                sent.join(", ")
            )
        });
    }

    /// POST an empty body to the controller info endpoint.
    pub async fn ping(&self) -> Outcome {
        match self.dispatcher.endpoint_url(INFO, &[]) {
            Ok(url) => self.dispatcher.write(&url, &json!({})).await,
            Err(e) => Outcome::Completed(Envelope::failure(e.to_string()).into_value()),
        }
    }

    /// Clear title, body and role selection. The delivery token is kept.
    pub fn reset(&mut self) {
        self.form.data.title.clear();
        self.form.data.body.clear();
        self.form.data.selected_roles.clear();
    }

    fn require_content(&mut self) -> bool {
        if self.form.data.title.is_empty() || self.form.data.body.is_empty() {
            self.fail(MISSING_CONTENT);
            return false;
        }
        true
    }

    fn fail(&mut self, message: &str) {
        self.form.error = true;
        self.form.message = Some(message.to_string());
    }

    fn begin(&mut self) {
        self.form.loading = true;
        self.form.error = false;
        self.form.message = None;
    }

    async fn dispatch_read<F>(
        &mut self,
        url: Result<Url, ClientError>,
        fallback: &'static str,
        on_success: F,
    ) where
        F: FnOnce(&Value) -> String,
    {
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                self.fail(&e.to_string());
                return;
            }
        };
        self.begin();
        let outcome = self.dispatcher.read(&url).await;
        self.finish(outcome, fallback, on_success);
    }

    fn finish<F>(&mut self, outcome: Outcome, fallback: &'static str, on_success: F)
    where
        F: FnOnce(&Value) -> String,
    {
        self.form.loading = false;
        let res = match outcome {
            Outcome::Completed(res) => res,
            Outcome::Aborted => {
                let status = self.dispatcher.session().status();
                self.form.error = true;
                self.form.message = status.message;
                return;
            }
        };

        if is_success(&res) {
            self.form.error = false;
            self.form.message = Some(on_success(&res));
            self.reset();
        } else {
            self.form.error = true;
            self.form.message = Some(
                result_message(&res)
                    .unwrap_or(fallback)
                    .to_string(),
            );
        }
    }
}

/// Role id for a role-list entry: the string itself, or a dropdown's `key`.
pub fn role_id(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("key").map(|k| match k {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human label for a role-list entry: the string itself, or a dropdown's `value`.
pub fn role_label(entry: &Value) -> String {
    match entry {
        Value::Object(obj) => obj
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| role_id(entry))
            .unwrap_or_default(),
        other => display_role(other),
    }
}

fn display_role(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `demo_token_<9 base36 chars>_<unix millis>`
fn placeholder_token() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("demo_token_{suffix}_{millis}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatcher::tests::{Call, Harness, ScriptedTransport, harness, logged_in};
    use crate::error::TransportError;
    use crate::store::{KeyValueStore, MemoryStore};

    fn controller(transport: ScriptedTransport) -> (NotificationController, Harness) {
        let h = harness("/admin-notification", logged_in(), transport);
        (NotificationController::new(h.dispatcher.clone()), h)
    }

    fn fill(c: &mut NotificationController, title: &str, body: &str) {
        let d = c.draft_mut();
        d.title = title.to_string();
        d.body = body.to_string();
    }

    #[test]
    fn test_placeholder_token_shape() {
        let token = placeholder_token();
        let parts: Vec<&str> = token.splitn(4, '_').collect();
        assert_eq!(parts[0], "demo");
        assert_eq!(parts[1], "token");
        assert_eq!(parts[2].len(), 9);
        assert!(parts[3].parse::<i128>().is_ok());
    }

    #[test]
    fn test_ensure_fcm_token_prefers_stored() {
        let (mut c, h) = controller(ScriptedTransport::default());
        h.store.set(FCM_TOKEN, "real-token").unwrap();
        assert_eq!(c.ensure_fcm_token(), "real-token");
    }

    #[test]
    fn test_ensure_fcm_token_generates_and_persists() {
        let (mut c, h) = controller(ScriptedTransport::default());
        let token = c.ensure_fcm_token().to_string();
        assert!(token.starts_with("demo_token_"));
        assert_eq!(h.store.get(FCM_TOKEN), Some(token.clone()));
        // Stable once stored.
        assert_eq!(c.ensure_fcm_token(), token);
    }

    #[tokio::test]
    async fn test_send_test_requires_title() {
        let (mut c, h) = controller(ScriptedTransport::default());
        c.ensure_fcm_token();
        fill(&mut c, "", "body");

        c.send_test().await;

        assert!(h.transport.calls().is_empty());
        assert!(c.form().error);
        assert_eq!(c.form().message.as_deref(), Some(MISSING_CONTENT));
        assert!(!c.form().loading);
    }

    #[tokio::test]
    async fn test_send_test_requires_token() {
        let (mut c, h) = controller(ScriptedTransport::default());
        fill(&mut c, "t", "b");

        c.send_test().await;

        assert!(h.transport.calls().is_empty());
        assert_eq!(c.form().message.as_deref(), Some(MISSING_TOKEN));
    }

    #[tokio::test]
    async fn test_send_test_success_resets_but_keeps_token() {
        let (mut c, h) = controller(
            ScriptedTransport::default().reply(Ok(json!({"success": true, "result": {}}))),
        );
        h.store.set(FCM_TOKEN, "tok 1").unwrap();
        c.ensure_fcm_token();
        fill(&mut c, "Hello", "World & all");
        c.set_role_selected("1", true);

        c.send_test().await;

        assert_eq!(
            h.transport.calls(),
            vec![Call::Get(
                "http://api.test/ORSP10/AdminNotification/sendTest?fcmToken=tok+1&title=Hello&body=World+%26+all"
                    .into()
            )]
        );
        let form = c.form();
        assert!(!form.error);
        assert!(!form.loading);
        assert_eq!(form.message.as_deref(), Some("Test notification sent successfully!"));
        assert!(form.data.title.is_empty());
        assert!(form.data.body.is_empty());
        assert!(form.data.selected_roles.is_empty());
        assert_eq!(form.data.fcm_token, "tok 1");
    }

    #[tokio::test]
    async fn test_send_broadcast_failure_keeps_fields() {
        let (mut c, h) = controller(
            ScriptedTransport::default().reply(Ok(json!({"success": false, "result": {}}))),
        );
        fill(&mut c, "Hello", "World");

        c.send_broadcast().await;

        assert_eq!(
            h.transport.calls(),
            vec![Call::Get(
                "http://api.test/ORSP10/AdminNotification/broadcast?title=Hello&body=World".into()
            )]
        );
        assert!(c.form().error);
        assert_eq!(
            c.form().message.as_deref(),
            Some("Failed to send broadcast notification")
        );
        assert_eq!(c.form().data.title, "Hello");
    }

    #[tokio::test]
    async fn test_send_role_based_requires_roles() {
        let (mut c, h) = controller(ScriptedTransport::default());
        fill(&mut c, "t", "b");

        c.send_role_based().await;

        assert!(h.transport.calls().is_empty());
        assert!(c.form().error);
        assert_eq!(c.form().message.as_deref(), Some(MISSING_ROLES));
    }

    #[tokio::test]
    async fn test_send_role_based_posts_body() {
        let (mut c, h) = controller(ScriptedTransport::default().reply(Ok(json!({
            "success": true,
            "result": {"sentToRoles": ["Admin", "Student"], "totalSent": 2}
        }))));
        fill(&mut c, "t", "b");
        c.set_role_selected("1", true);
        c.set_role_selected("3", true);
        c.set_role_selected("1", true);

        c.send_role_based().await;

        assert_eq!(
            h.transport.calls(),
            vec![Call::Post(
                "http://api.test/ORSP10/AdminNotification/sendToRoles".into(),
                json!({"title": "t", "body": "b", "selectedRoles": ["1", "3"]})
            )]
        );
        assert_eq!(
            c.form().message.as_deref(),
            Some("Role-based notification sent successfully to: Admin, Student!")
        );
        assert!(c.form().data.selected_roles.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_message_reaches_form() {
        let (mut c, _h) = controller(
            ScriptedTransport::default().reply(Err(TransportError::new(Some(500), "Server down"))),
        );
        fill(&mut c, "t", "b");
        c.draft_mut().kind = NotificationKind::Broadcast;

        c.submit().await;

        assert!(c.form().error);
        assert_eq!(c.form().message.as_deref(), Some("Server down"));
    }

    #[tokio::test]
    async fn test_submit_dispatches_on_kind() {
        let (mut c, h) = controller(ScriptedTransport::default());
        fill(&mut c, "t", "b");
        c.set_role_selected("2", true);
        c.draft_mut().kind = NotificationKind::RoleBased;

        c.submit().await;

        assert!(matches!(h.transport.calls().as_slice(), [Call::Post(url, _)] if url.ends_with("/sendToRoles")));
    }

    #[tokio::test]
    async fn test_aborted_send_clears_loading() {
        let h = harness("/admin-notification", MemoryStore::new(), ScriptedTransport::default());
        let mut c = NotificationController::new(h.dispatcher.clone());
        fill(&mut c, "t", "b");

        c.send_broadcast().await;

        assert!(h.transport.calls().is_empty());
        assert!(!c.form().loading);
        assert!(c.form().error);
        assert_eq!(
            c.form().message.as_deref(),
            Some(crate::session::GATE_EXPIRED_MESSAGE)
        );
        assert_eq!(c.form().data.title, "t");
    }

    #[tokio::test]
    async fn test_load_roles_success() {
        let (mut c, _h) = controller(ScriptedTransport::default().reply(Ok(json!({
            "success": true,
            "result": {"roleList": ["admin", "editor"]}
        }))));

        c.load_available_roles().await;

        assert_eq!(c.available_roles(), &[json!("admin"), json!("editor")]);
        assert!(!c.roles_loading());
    }

    #[tokio::test]
    async fn test_load_roles_failure_is_silent() {
        let (mut c, _h) = controller(
            ScriptedTransport::default().reply(Err(TransportError::new(Some(500), "nope"))),
        );

        c.load_available_roles().await;

        assert!(c.available_roles().is_empty());
        assert!(!c.form().error);
        assert_eq!(c.form().message, None);
    }

    #[tokio::test]
    async fn test_mount_sets_token_then_loads_roles() {
        let (mut c, h) = controller(ScriptedTransport::default().reply(Ok(json!({
            "success": true,
            "result": {"roleList": [{"key": 1, "value": "Admin"}]}
        }))));

        c.mount().await;

        assert!(!c.form().data.fcm_token.is_empty());
        assert_eq!(h.transport.calls().len(), 1);
        assert_eq!(role_id(&c.available_roles()[0]).as_deref(), Some("1"));
        assert_eq!(role_label(&c.available_roles()[0]), "Admin");
    }

    #[test]
    fn test_role_selection_toggle() {
        let (mut c, _h) = controller(ScriptedTransport::default());
        c.set_role_selected("5", true);
        assert!(c.is_role_selected("5"));
        c.set_role_selected("5", false);
        assert!(!c.is_role_selected("5"));
        c.set_role_selected("9", false);
        assert!(c.form().data.selected_roles.is_empty());
    }

    #[tokio::test]
    async fn test_ping_posts_empty_body_to_info_endpoint() {
        let reply = json!({"success": true, "result": {"message": "AdminNotification ready"}});
        let (c, h) = controller(ScriptedTransport::default().reply(Ok(reply.clone())));

        let out = c.ping().await;

        assert_eq!(out, Outcome::Completed(reply));
        assert_eq!(
            h.transport.calls(),
            vec![Call::Post("http://api.test/ORSP10/AdminNotification".into(), json!({}))]
        );
    }

    #[tokio::test]
    async fn test_ping_server_failure_becomes_envelope() {
        let (c, _h) = controller(
            ScriptedTransport::default().reply(Err(TransportError::new(Some(500), "down"))),
        );
        assert_eq!(
            c.ping().await,
            Outcome::Completed(json!({"success": false, "result": {"message": "down"}}))
        );
    }

    #[tokio::test]
    async fn test_ping_aborted_without_session() {
        let h = harness("/admin-notification", MemoryStore::new(), ScriptedTransport::default());
        let c = NotificationController::new(h.dispatcher.clone());

        assert_eq!(c.ping().await, Outcome::Aborted);
        assert!(h.transport.calls().is_empty());
        assert_eq!(h.nav.history(), vec!["/login"]);
    }

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(serde_json::to_value(NotificationKind::RoleBased).unwrap(), json!("role-based"));
        let kind: NotificationKind = serde_json::from_value(json!("broadcast")).unwrap();
        assert_eq!(kind, NotificationKind::Broadcast);
    }
}
