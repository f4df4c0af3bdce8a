use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use wikibase_importer::ImporterConfig;

pub const API_PATH: &str = "/w/api.php";
pub const USERNAME: &str = "ImportBot";
pub const PASSWORD: &str = "s3cret";
pub const EDIT_TOKEN: &str = "edit+\\";

/// An entity accepted by the fake.
#[derive(Debug, Clone)]
pub struct Created {
    pub kind: String,
    pub id: String,
    pub data: Value,
}

impl Created {
    pub fn label(&self) -> &str {
        self.data["labels"]["en"]["value"].as_str().unwrap_or_default()
    }
}

#[derive(Default)]
struct State {
    next_item: u64,
    next_property: u64,
    property_labels: HashMap<String, String>,
    rejected_labels: Vec<String>,
    created: Vec<Created>,
    edited: Vec<Created>,
    calls: usize,
}

/// Stateful stand-in for a MediaWiki + Wikibase API endpoint.
///
/// Handles the login handshake and `wbeditentity`. Creations (`new=`) get
/// per-label property uniqueness; edits (`id=`) must name an entity the fake
/// created. Requests without the session's token or cookies are rejected.
#[derive(Clone, Default)]
pub struct FakeWikibase {
    state: Arc<Mutex<State>>,
}

impl FakeWikibase {
    /// Start a mock server answering every POST on [`API_PATH`].
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::default();
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    /// A property with `label` exists before the import starts.
    pub fn seed_property(&self, label: &str, id: &str) {
        self.state
            .lock()
            .unwrap()
            .property_labels
            .insert(label.to_string(), id.to_string());
    }

    /// Creating an entity labelled `label` fails with an unrecoverable error.
    pub fn reject(&self, label: &str) {
        self.state.lock().unwrap().rejected_labels.push(label.to_string());
    }

    pub fn created(&self) -> Vec<Created> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn created_labelled(&self, label: &str) -> Vec<Created> {
        self.created().into_iter().filter(|c| c.label() == label).collect()
    }

    /// Edits of existing entities, in arrival order.
    pub fn edited(&self) -> Vec<Created> {
        self.state.lock().unwrap().edited.clone()
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    fn edit_entity(&self, form: &HashMap<String, String>, cookie: &str) -> ResponseTemplate {
        if form.get("token").map(String::as_str) != Some(EDIT_TOKEN) || !cookie.contains("session=s2") {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}));
        }
        match form.get("id") {
            Some(id) if !form.contains_key("new") => self.edit(id, form),
            _ => self.create(form),
        }
    }

    fn edit(&self, id: &str, form: &HashMap<String, String>) -> ResponseTemplate {
        let data: Value = match form.get("data").map(|d| serde_json::from_str(d)) {
            Some(Ok(data)) => data,
            _ => return ResponseTemplate::new(400).set_body_string("bad data"),
        };

        let mut state = self.state.lock().unwrap();
        let Some(kind) = state.created.iter().find(|c| c.id == id).map(|c| c.kind.clone()) else {
            return ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "no-such-entity", "info": format!("Could not find an entity with the ID \"{id}\".")}
            }));
        };
        if data.get("id").and_then(Value::as_str) != Some(id) {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": "param-illegal", "info": "Entity id mismatch."}}));
        }

        state.edited.push(Created {
            kind: kind.clone(),
            id: id.to_string(),
            data,
        });

        ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "entity": {"id": id, "type": kind}
        }))
    }

    fn create(&self, form: &HashMap<String, String>) -> ResponseTemplate {
        let kind = form.get("new").cloned().unwrap_or_default();
        let data: Value = match form.get("data").map(|d| serde_json::from_str(d)) {
            Some(Ok(data)) => data,
            _ => return ResponseTemplate::new(400).set_body_string("bad data"),
        };

        let mut state = self.state.lock().unwrap();
        let label = data["labels"]["en"]["value"].as_str().unwrap_or_default().to_string();

        if state.rejected_labels.contains(&label) {
            return ResponseTemplate::new(200).set_body_json(json!({
                "error": {
                    "code": "failed-save",
                    "messages": [{"name": "some-other-error", "parameters": []}]
                }
            }));
        }

        if kind == "property" {
            if let Some(existing) = state.property_labels.get(&label) {
                return ResponseTemplate::new(200).set_body_json(json!({
                    "error": {
                        "code": "failed-save",
                        "info": "The save has failed.",
                        "messages": [{
                            "name": "wikibase-validator-label-conflict",
                            "parameters": [label, "en", format!("[[Property:{existing}|{existing}]]")]
                        }]
                    }
                }));
            }
        }

        let id = if kind == "property" {
            state.next_property += 1;
            let id = format!("P{}", 100 + state.next_property);
            state.property_labels.insert(label, id.clone());
            id
        } else {
            state.next_item += 1;
            format!("Q{}", state.next_item)
        };

        state.created.push(Created {
            kind: kind.clone(),
            id: id.clone(),
            data,
        });

        ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "entity": {"id": id, "type": kind}
        }))
    }
}

impl Respond for FakeWikibase {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.state.lock().unwrap().calls += 1;

        let form: HashMap<String, String> = serde_urlencoded::from_bytes(&request.body).unwrap_or_default();
        let cookie = request
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match form.get("action").map(String::as_str) {
            Some("login") if form.contains_key("lgname") => {
                if form.get("lgname").map(String::as_str) != Some(USERNAME)
                    || form.get("lgpassword").map(String::as_str) != Some(PASSWORD)
                {
                    return ResponseTemplate::new(200)
                        .set_body_json(json!({"login": {"result": "Failed", "reason": "Incorrect password"}}));
                }
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=s1; path=/")
                    .set_body_json(json!({"login": {"result": "NeedToken", "token": "logintok"}}))
            }
            Some("login") if form.get("lgtoken").map(String::as_str) == Some("logintok") && cookie.contains("session=s1") => {
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=s2; path=/")
                    .set_body_json(json!({"login": {"result": "Success", "lgusername": USERNAME}}))
            }
            Some("query") if cookie.contains("session=s2") => ResponseTemplate::new(200)
                .set_body_json(json!({"batchcomplete": "", "query": {"tokens": {"csrftoken": EDIT_TOKEN}}})),
            Some("wbeditentity") => self.edit_entity(&form, &cookie),
            _ => ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": "unknown_action", "info": "Unrecognized request."}})),
        }
    }
}

pub fn config_for(server: &MockServer) -> ImporterConfig {
    ImporterConfig {
        api_endpoint: format!("{}{}", server.uri(), API_PATH),
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        request_timeout_secs: 5,
        ..ImporterConfig::default()
    }
}

/// Temporary GDM input file.
pub struct InputFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl InputFile {
    pub fn new(content: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("input.json");
        std::fs::write(&path, content).expect("write input file");
        Self { _dir: dir, path }
    }
}
