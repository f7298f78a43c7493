use crate::subscribe::descriptor::SubscriptionDescriptor;
use crate::subscribe::sink::EventSink;
use std::sync::Arc;

/// Shared by every request; nothing in here changes after the listener starts.
#[derive(Clone)]
pub(super) struct EndpointState {
    descriptor: Arc<SubscriptionDescriptor>,
    sink: Arc<dyn EventSink>,
}

impl EndpointState {
    pub fn new(descriptor: Arc<SubscriptionDescriptor>, sink: Arc<dyn EventSink>) -> Self {
        Self { descriptor, sink }
    }

    pub fn descriptor(&self) -> &SubscriptionDescriptor {
        &self.descriptor
    }

    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }
}
