//! Request Builder
//!
//! A [`RequestBuilder`] names a resource kind, an operation and optional
//! default parameters. It is a plain value: each `with_*` call hands back a
//! new builder, so one builder can serve as the prototype for many requests.
//!
//! ```ignore
//! let get_vm = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get);
//! let applied = get_vm.apply(&dispatcher, "vm-1", None).await?;
//! println!("{} -> {}", applied.info.action, applied.info.status);
//! ```

use super::dispatch::{merge_params, DispatchTable, Strategy};
use super::error::{ClientError, RemoteError, RequestError};
use super::kind::{OperationKind, ResourceKind};
use super::registry::{ManagerRegistry, Params, ResourceManager};
use crate::cloud::auth::{Session, SessionSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Normalized outcome of an applied request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalInfo {
    pub action: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub id: String,
}

/// A successful call: the raw remote object and its summary
#[derive(Debug, Clone)]
pub struct Applied {
    pub object: Value,
    pub info: ExternalInfo,
}

/// Everything `apply` needs at call time
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ManagerRegistry>,
    table: Arc<DispatchTable>,
    sessions: Arc<dyn SessionSource>,
}

impl Dispatcher {
    pub fn new(registry: ManagerRegistry, sessions: Arc<dyn SessionSource>) -> Self {
        Self {
            registry: Arc::new(registry),
            table: Arc::new(DispatchTable::new()),
            sessions,
        }
    }

    /// Use a table with extra custom operations registered
    pub fn with_table(mut self, table: DispatchTable) -> Self {
        self.table = Arc::new(table);
        self
    }

    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Immutable description of an operation on a resource kind
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBuilder {
    resource: ResourceKind,
    operation: OperationKind,
    default_params: Option<Params>,
}

impl RequestBuilder {
    pub fn new(resource: ResourceKind, operation: OperationKind) -> Self {
        Self {
            resource,
            operation,
            default_params: None,
        }
    }

    pub fn with_resource(self, resource: ResourceKind) -> Self {
        Self { resource, ..self }
    }

    pub fn with_operation(self, operation: OperationKind) -> Self {
        Self { operation, ..self }
    }

    /// Parameters forced into every call; they override caller values
    pub fn with_default_params(self, params: Params) -> Self {
        Self {
            default_params: Some(params),
            ..self
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn operation(&self) -> &OperationKind {
        &self.operation
    }

    pub fn default_params(&self) -> Option<&Params> {
        self.default_params.as_ref()
    }

    /// Resource tag followed by operation name, e.g. `VMGet`
    pub fn action_name(&self) -> String {
        format!("{}{}", self.resource, self.operation)
    }

    /// Execute the request against the manager registered for the resource kind
    ///
    /// `id` may be empty: `Create` ignores it, and `Get` then resolves to the
    /// first object the list call returns for `params`.
    pub async fn apply(
        &self,
        dispatcher: &Dispatcher,
        id: &str,
        params: Option<Params>,
    ) -> Result<Applied, RequestError> {
        let action = self.action_name();

        let Some(manager) = dispatcher.registry.lookup(self.resource) else {
            return Err(RequestError::UnknownResource {
                resource: self.resource,
                action,
            });
        };

        let strategy = dispatcher.table.strategy(&self.operation);
        let params = merge_params(params, self.default_params.as_ref());

        tracing::debug!("apply: action={}, strategy={}, id={}", action, strategy, id);

        let session = dispatcher.sessions.session().await;
        let object = match execute(manager.as_ref(), &strategy, &session, id, &params).await {
            Ok(object) => object,
            Err(err) => return Err(self.translate(action, err)),
        };

        let status = string_field(&object, "status");
        let id = if id.is_empty() {
            string_field(&object, "id")
        } else {
            id.to_string()
        };

        Ok(Applied {
            object,
            info: ExternalInfo { action, status, id },
        })
    }

    fn translate(&self, action: String, err: anyhow::Error) -> RequestError {
        if let Some(client) = ClientError::inspect(&err) {
            return RemoteError::from_client(self.resource, action, client).into();
        }
        RequestError::Transport {
            resource: self.resource,
            action,
            cause: err,
        }
    }
}

async fn execute(
    manager: &dyn ResourceManager,
    strategy: &Strategy,
    session: &Session,
    id: &str,
    params: &Params,
) -> anyhow::Result<Value> {
    match strategy {
        Strategy::Create => manager.create(session, params).await,
        Strategy::Delete => manager.delete_with_params(session, id, params, None).await,
        Strategy::Update => manager.update(session, id, params).await,
        Strategy::Get if !id.is_empty() => manager.get(session, id, params).await,
        Strategy::Get => {
            let list = manager.list(session, params).await?;
            list.data
                .into_iter()
                .next()
                .ok_or_else(|| ClientError::not_found("").into())
        }
        Strategy::Specific { spec } => manager.get_specific(session, id, spec, params).await,
        Strategy::Action { action } => manager.perform_action(session, id, action, params).await,
    }
}

/// Scalar field as text; numbers and bools are rendered, anything else is empty
fn string_field(object: &Value, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::auth::StaticSession;
    use crate::resource::registry::ListResult;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every call and answers from canned data
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        list: Vec<Value>,
        fail_with: Option<ClientError>,
        reply: Option<Value>,
    }

    impl Recorder {
        fn record(&self, call: String) -> Result<Value> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some(err) => Err(err.clone().into()),
                None => Ok(self
                    .reply
                    .clone()
                    .unwrap_or_else(|| json!({ "id": "remote-id", "status": "running" }))),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceManager for Recorder {
        async fn create(&self, _: &Session, params: &Params) -> Result<Value> {
            self.record(format!("create {}", Value::Object(params.clone())))
        }
        async fn get(&self, _: &Session, id: &str, _: &Params) -> Result<Value> {
            self.record(format!("get {}", id))
        }
        async fn list(&self, _: &Session, _: &Params) -> Result<ListResult> {
            self.calls.lock().unwrap().push("list".to_string());
            Ok(ListResult {
                data: self.list.clone(),
                total: Some(self.list.len() as u64),
            })
        }
        async fn update(&self, _: &Session, id: &str, _: &Params) -> Result<Value> {
            self.record(format!("update {}", id))
        }
        async fn delete_with_params(
            &self,
            _: &Session,
            id: &str,
            _: &Params,
            extra: Option<&Params>,
        ) -> Result<Value> {
            self.record(format!("delete {} extra={}", id, extra.is_some()))
        }
        async fn get_specific(&self, _: &Session, id: &str, spec: &str, _: &Params) -> Result<Value> {
            self.record(format!("specific {} {}", id, spec))
        }
        async fn perform_action(&self, _: &Session, id: &str, action: &str, _: &Params) -> Result<Value> {
            self.record(format!("action {} {}", id, action))
        }
    }

    fn dispatcher_with(kind: ResourceKind, recorder: Arc<Recorder>) -> Dispatcher {
        let mut registry = ManagerRegistry::new();
        registry.register(kind, recorder);
        Dispatcher::new(registry, Arc::new(StaticSession::new("test-token")))
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_action_name() {
        let request = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get);
        assert_eq!(request.action_name(), "VMGet");
        let request = request.with_resource(ResourceKind::Eip).with_operation(OperationKind::ChangeBandwidth);
        assert_eq!(request.action_name(), "EIPChangeBandwidth");
    }

    #[test]
    fn test_deriving_never_mutates_prototype() {
        let prototype = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get);
        let derived = prototype.clone().with_operation(OperationKind::Stop);
        let forced = prototype
            .clone()
            .with_default_params(params(json!({"force": true})));

        assert_eq!(prototype.operation(), &OperationKind::Get);
        assert!(prototype.default_params().is_none());
        assert_eq!(derived.operation(), &OperationKind::Stop);
        assert!(forced.default_params().is_some());
    }

    #[tokio::test]
    async fn test_unregistered_resource_never_calls_remote() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(ResourceKind::Vm, recorder.clone());

        let err = RequestBuilder::new(ResourceKind::Disk, OperationKind::Create)
            .apply(&dispatcher, "", None)
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::UnknownResource { .. }));
        assert_eq!(err.info().action, "DiskCreate");
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_with_id_calls_get_once() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(ResourceKind::Vm, recorder.clone());

        let applied = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get)
            .apply(&dispatcher, "vm-1", None)
            .await
            .unwrap();

        assert_eq!(recorder.calls(), vec!["get vm-1"]);
        assert_eq!(
            applied.info,
            ExternalInfo {
                action: "VMGet".into(),
                status: "running".into(),
                id: "vm-1".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_without_id_takes_first_listed() {
        let recorder = Arc::new(Recorder {
            list: vec![
                json!({"id": "first", "status": "ready"}),
                json!({"id": "second", "status": "deleting"}),
            ],
            ..Recorder::default()
        });
        let dispatcher = dispatcher_with(ResourceKind::Vm, recorder.clone());

        let applied = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get)
            .apply(&dispatcher, "", Some(params(json!({"name": "web"}))))
            .await
            .unwrap();

        assert_eq!(recorder.calls(), vec!["list"]);
        assert_eq!(applied.info.id, "first");
        assert_eq!(applied.info.status, "ready");
    }

    #[tokio::test]
    async fn test_get_without_id_and_empty_list_is_not_found() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(ResourceKind::Eip, recorder.clone());

        let err = RequestBuilder::new(ResourceKind::Eip, OperationKind::Get)
            .apply(&dispatcher, "", None)
            .await
            .unwrap_err();

        assert_eq!(err.remote().map(|r| r.code), Some(404));
        assert!(err.is_not_found(ResourceKind::Eip));
        assert!(!err.is_not_found(ResourceKind::Vm));
        assert_eq!(err.info().action, "EIPGet");
        assert_eq!(err.to_string(), "Exec 'EIPGet', NotFoundError: ");
        assert_eq!(recorder.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_specific_and_action_dispatch() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(ResourceKind::Eip, recorder.clone());

        RequestBuilder::new(ResourceKind::Eip, OperationKind::GetStatus)
            .apply(&dispatcher, "eip-1", None)
            .await
            .unwrap();
        RequestBuilder::new(ResourceKind::Eip, OperationKind::ChangeBandwidth)
            .apply(&dispatcher, "eip-1", None)
            .await
            .unwrap();
        RequestBuilder::new(ResourceKind::Eip, OperationKind::Delete)
            .apply(&dispatcher, "eip-1", None)
            .await
            .unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                "specific eip-1 status",
                "action eip-1 change-bandwidth",
                "delete eip-1 extra=false",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_uses_merged_params_and_remote_id() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(ResourceKind::Disk, recorder.clone());

        let applied = RequestBuilder::new(ResourceKind::Disk, OperationKind::Create)
            .with_default_params(params(json!({"a": 2, "b": 3})))
            .apply(&dispatcher, "", Some(params(json!({"a": 1}))))
            .await
            .unwrap();

        assert_eq!(recorder.calls(), vec![r#"create {"a":2,"b":3}"#]);
        assert_eq!(applied.info.id, "remote-id");
        assert_eq!(applied.info.action, "DiskCreate");
    }

    #[tokio::test]
    async fn test_numeric_id_and_status_are_read_as_text() {
        let recorder = Arc::new(Recorder {
            reply: Some(json!({ "id": 42, "status": 3 })),
            ..Recorder::default()
        });
        let dispatcher = dispatcher_with(ResourceKind::Vm, recorder);

        let applied = RequestBuilder::new(ResourceKind::Vm, OperationKind::Create)
            .apply(&dispatcher, "", None)
            .await
            .unwrap();

        assert_eq!(applied.info.id, "42");
        assert_eq!(applied.info.status, "3");
    }

    #[tokio::test]
    async fn test_non_scalar_id_is_empty() {
        let recorder = Arc::new(Recorder {
            reply: Some(json!({ "id": {"uuid": "x"}, "status": null })),
            ..Recorder::default()
        });
        let dispatcher = dispatcher_with(ResourceKind::Vm, recorder);

        let applied = RequestBuilder::new(ResourceKind::Vm, OperationKind::Create)
            .apply(&dispatcher, "", None)
            .await
            .unwrap();

        assert_eq!(applied.info.id, "");
        assert_eq!(applied.info.status, "");
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_structured_error() {
        let recorder = Arc::new(Recorder {
            fail_with: Some(ClientError::new(409, "ConflictError", "disk attached")),
            ..Recorder::default()
        });
        let dispatcher = dispatcher_with(ResourceKind::Disk, recorder);

        let err = RequestBuilder::new(ResourceKind::Disk, OperationKind::Delete)
            .apply(&dispatcher, "disk-1", None)
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Exec 'DiskDelete', ConflictError: disk attached"
        );
    }
}
