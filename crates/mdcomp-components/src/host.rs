//! Component host: runs components on a dedicated thread.
//!
//! The render pipeline is synchronous. [`DispatchHost`] owns every component
//! on its own thread; each invocation crosses a bounded channel and the caller
//! blocks on a reply channel, optionally with a timeout. Components therefore
//! only need to be `Send`.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::binder::ParamValue;
use crate::error::ComponentError;
use crate::schema::ComponentSchema;

/// A fully bound component call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Tag name as written in the document.
    pub component: String,
    pub type_name: String,
    /// Bound values keyed by parameter name.
    pub parameters: HashMap<String, ParamValue>,
    /// Rendered named slot markup keyed by slot name.
    pub slots: HashMap<String, String>,
    /// Rendered default slot markup.
    pub default_content: Option<String>,
}

impl Invocation {
    pub fn new(component: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Look up a bound value, ignoring ASCII case.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters
            .get(name)
            .or_else(|| lookup_ignore_case(&self.parameters, name))
    }

    /// Look up named slot markup, ignoring ASCII case.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .or_else(|| lookup_ignore_case(&self.slots, name))
            .map(String::as_str)
    }
}

fn lookup_ignore_case<'a, V>(map: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Per-document state available to components during one render.
#[derive(Debug)]
pub struct RenderScope {
    id: u64,
    counters: HashMap<String, u64>,
}

impl RenderScope {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            counters: HashMap::new(),
        }
    }

    /// Identifier of the render this scope belongs to.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next document-unique id for `prefix`: `prefix-1`, `prefix-2`, ...
    pub fn next_id(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_owned()).or_insert(0);
        *counter += 1;
        format!("{prefix}-{counter}")
    }
}

/// A render unit invoked for a component tag.
pub trait Component: Send {
    /// Parameters the component accepts.
    fn schema(&self) -> &ComponentSchema;

    /// Render the component to markup.
    fn render(
        &mut self,
        invocation: &Invocation,
        scope: &mut RenderScope,
    ) -> Result<String, ComponentError>;
}

/// Something that can run component invocations.
pub trait ComponentHost: Send + Sync {
    /// Open a scope for rendering one document.
    fn open_scope(&self) -> Box<dyn HostScope + '_>;
}

impl<H: ComponentHost + ?Sized> ComponentHost for Arc<H> {
    fn open_scope(&self) -> Box<dyn HostScope + '_> {
        (**self).open_scope()
    }
}

/// Per-document channel to a host.
///
/// Dropping the scope releases its state on the host.
pub trait HostScope {
    fn invoke(&mut self, invocation: Invocation) -> Result<String, ComponentError>;
}

/// Configuration for [`DispatchHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum number of queued messages before callers block.
    pub queue_capacity: usize,
    /// How long a caller waits for a reply (`None` waits forever).
    pub timeout: Option<Duration>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            timeout: None,
        }
    }
}

impl HostConfig {
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

type Reply = Result<String, ComponentError>;

enum HostMessage {
    Invoke {
        scope: u64,
        invocation: Invocation,
        reply: mpsc::Sender<Reply>,
    },
    CloseScope(u64),
}

/// Host that runs all components on one dedicated thread.
///
/// Dropping the host disconnects the queue and joins the thread.
pub struct DispatchHost {
    sender: Option<SyncSender<HostMessage>>,
    worker: Option<JoinHandle<()>>,
    next_scope: AtomicU64,
    timeout: Option<Duration>,
}

impl DispatchHost {
    /// Start the host thread with components keyed by tag name.
    pub fn spawn(
        components: HashMap<String, Box<dyn Component>>,
        config: HostConfig,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(config.queue_capacity.max(1));
        let worker = thread::Builder::new()
            .name("mdcomp-host".to_owned())
            .spawn(move || run_host(components, &receiver))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            next_scope: AtomicU64::new(1),
            timeout: config.timeout,
        })
    }

    fn send(&self, message: HostMessage) -> Result<(), ComponentError> {
        self.sender
            .as_ref()
            .ok_or(ComponentError::HostUnavailable)?
            .send(message)
            .map_err(|_| ComponentError::HostUnavailable)
    }
}

impl ComponentHost for DispatchHost {
    fn open_scope(&self) -> Box<dyn HostScope + '_> {
        let id = self.next_scope.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(scope = id, "Opened render scope");
        Box::new(DispatchScope { host: self, id })
    }
}

impl Drop for DispatchHost {
    fn drop(&mut self) {
        // Disconnect first so the worker loop ends
        self.sender.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("Component host thread panicked");
        }
    }
}

struct DispatchScope<'a> {
    host: &'a DispatchHost,
    id: u64,
}

impl HostScope for DispatchScope<'_> {
    fn invoke(&mut self, invocation: Invocation) -> Result<String, ComponentError> {
        let (reply, response) = mpsc::channel();
        self.host.send(HostMessage::Invoke {
            scope: self.id,
            invocation,
            reply,
        })?;

        match self.host.timeout {
            Some(timeout) => response.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => ComponentError::Timeout(timeout),
                RecvTimeoutError::Disconnected => ComponentError::HostUnavailable,
            })?,
            None => response
                .recv()
                .map_err(|_| ComponentError::HostUnavailable)?,
        }
    }
}

impl Drop for DispatchScope<'_> {
    fn drop(&mut self) {
        // Ignore send failure: the host is already gone
        let _ = self.host.send(HostMessage::CloseScope(self.id));
        tracing::debug!(scope = self.id, "Closed render scope");
    }
}

fn run_host(
    mut components: HashMap<String, Box<dyn Component>>,
    receiver: &Receiver<HostMessage>,
) {
    let mut scopes: HashMap<u64, RenderScope> = HashMap::new();

    for message in receiver {
        match message {
            HostMessage::Invoke {
                scope: scope_id,
                invocation,
                reply,
            } => {
                let scope = scopes
                    .entry(scope_id)
                    .or_insert_with(|| RenderScope::new(scope_id));
                let result = match components.get_mut(&invocation.component) {
                    Some(component) => invoke_guarded(component.as_mut(), &invocation, scope),
                    None => Err(ComponentError::NotHosted(invocation.component.clone())),
                };
                // The caller may have timed out and dropped the receiver
                let _ = reply.send(result);
            }
            HostMessage::CloseScope(id) => {
                scopes.remove(&id);
            }
        }
    }
}

fn invoke_guarded(
    component: &mut dyn Component,
    invocation: &Invocation,
    scope: &mut RenderScope,
) -> Reply {
    panic::catch_unwind(AssertUnwindSafe(|| component.render(invocation, scope)))
        .unwrap_or_else(|payload| Err(ComponentError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParamSpec, ParamType};

    static_assertions::assert_impl_all!(DispatchHost: Send, Sync);

    /// Echoes the `text` parameter and a scope-unique id.
    struct Echo {
        schema: ComponentSchema,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                schema: ComponentSchema::new("Echo")
                    .with_param(ParamSpec::value("text", ParamType::String)),
            }
        }
    }

    impl Component for Echo {
        fn schema(&self) -> &ComponentSchema {
            &self.schema
        }

        fn render(
            &mut self,
            invocation: &Invocation,
            scope: &mut RenderScope,
        ) -> Result<String, ComponentError> {
            let text = invocation
                .parameter("text")
                .map(ToString::to_string)
                .unwrap_or_default();
            Ok(format!("{}:{text}", scope.next_id("echo")))
        }
    }

    /// Fails or panics depending on the `mode` parameter.
    struct Faulty {
        schema: ComponentSchema,
    }

    impl Component for Faulty {
        fn schema(&self) -> &ComponentSchema {
            &self.schema
        }

        fn render(
            &mut self,
            invocation: &Invocation,
            _scope: &mut RenderScope,
        ) -> Result<String, ComponentError> {
            match invocation.parameter("mode").map(ToString::to_string).as_deref() {
                Some("panic") => panic!("faulty component"),
                Some("sleep") => {
                    thread::sleep(Duration::from_millis(200));
                    Ok("late".to_owned())
                }
                _ => Err(ComponentError::failed("faulty component")),
            }
        }
    }

    fn host(config: HostConfig) -> DispatchHost {
        let mut components: HashMap<String, Box<dyn Component>> = HashMap::new();
        components.insert("Echo".to_owned(), Box::new(Echo::new()));
        components.insert(
            "Faulty".to_owned(),
            Box::new(Faulty {
                schema: ComponentSchema::new("Faulty"),
            }),
        );
        DispatchHost::spawn(components, config).unwrap()
    }

    fn invocation(component: &str, params: &[(&str, &str)]) -> Invocation {
        let mut invocation = Invocation::new(component, component);
        for (key, value) in params {
            invocation
                .parameters
                .insert((*key).to_owned(), ParamValue::String((*value).to_owned()));
        }
        invocation
    }

    #[test]
    fn test_invoke_returns_markup() {
        let host = host(HostConfig::default());
        let mut scope = host.open_scope();
        let result = scope.invoke(invocation("Echo", &[("text", "hi")]));
        assert_eq!(result, Ok("echo-1:hi".to_owned()));
    }

    #[test]
    fn test_scope_state_is_per_render() {
        let host = host(HostConfig::default());
        {
            let mut scope = host.open_scope();
            assert_eq!(scope.invoke(invocation("Echo", &[])), Ok("echo-1:".to_owned()));
            assert_eq!(scope.invoke(invocation("Echo", &[])), Ok("echo-2:".to_owned()));
        }
        let mut scope = host.open_scope();
        assert_eq!(scope.invoke(invocation("Echo", &[])), Ok("echo-1:".to_owned()));
    }

    #[test]
    fn test_component_error_is_returned() {
        let host = host(HostConfig::default());
        let mut scope = host.open_scope();
        assert_eq!(
            scope.invoke(invocation("Faulty", &[])),
            Err(ComponentError::failed("faulty component"))
        );
    }

    #[test]
    fn test_panic_is_caught_and_host_survives() {
        let host = host(HostConfig::default());
        let mut scope = host.open_scope();
        assert_eq!(
            scope.invoke(invocation("Faulty", &[("mode", "panic")])),
            Err(ComponentError::Panicked("faulty component".to_owned()))
        );
        assert_eq!(
            scope.invoke(invocation("Echo", &[("text", "ok")])),
            Ok("echo-1:ok".to_owned())
        );
    }

    #[test]
    fn test_unknown_component_not_hosted() {
        let host = host(HostConfig::default());
        let mut scope = host.open_scope();
        assert_eq!(
            scope.invoke(invocation("Missing", &[])),
            Err(ComponentError::NotHosted("Missing".to_owned()))
        );
    }

    #[test]
    fn test_timeout() {
        let timeout = Duration::from_millis(20);
        let host = host(HostConfig::default().with_timeout(Some(timeout)));
        let mut scope = host.open_scope();
        assert_eq!(
            scope.invoke(invocation("Faulty", &[("mode", "sleep")])),
            Err(ComponentError::Timeout(timeout))
        );
    }

    #[test]
    fn test_concurrent_scopes() {
        let host = Arc::new(host(HostConfig::default().with_queue_capacity(2)));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let host = Arc::clone(&host);
                thread::spawn(move || {
                    let mut scope = host.open_scope();
                    (1..=5)
                        .map(|n| {
                            let text = format!("{i}");
                            let result = scope.invoke(invocation("Echo", &[("text", &text)]));
                            result == Ok(format!("echo-{n}:{i}"))
                        })
                        .all(|ok| ok)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_invocation_lookup_ignores_case() {
        let mut invocation = invocation("Echo", &[("Title", "x")]);
        invocation
            .slots
            .insert("Header".to_owned(), "<b>h</b>".to_owned());
        assert_eq!(
            invocation.parameter("title"),
            Some(&ParamValue::String("x".to_owned()))
        );
        assert_eq!(invocation.slot("HEADER"), Some("<b>h</b>"));
        assert_eq!(invocation.slot("footer"), None);
    }

    #[test]
    fn test_render_scope_counters_per_prefix() {
        let mut scope = RenderScope::new(7);
        assert_eq!(scope.id(), 7);
        assert_eq!(scope.next_id("tab"), "tab-1");
        assert_eq!(scope.next_id("tab"), "tab-2");
        assert_eq!(scope.next_id("card"), "card-1");
    }

    #[test]
    fn test_host_config_builders() {
        let config = HostConfig::default()
            .with_queue_capacity(0)
            .with_timeout(Some(Duration::from_secs(1)));
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.timeout, Some(Duration::from_secs(1)));
    }
}
