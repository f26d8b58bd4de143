//! Preview handles for attached files.
//!
//! The core allocates handles; the shell backs each one with a platform
//! resource (an object URL on the web) and must free it on `Release`.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::attachments::PreviewHandle;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum PreviewOperation {
    Create {
        handle: PreviewHandle,
        raw_ref: String,
    },
    Release {
        handle: PreviewHandle,
    },
}

impl Operation for PreviewOperation {
    type Output = ();
}

pub struct Preview<Ev> {
    context: CapabilityContext<PreviewOperation, Ev>,
}

impl<Ev> Capability<Ev> for Preview<Ev> {
    type Operation = PreviewOperation;
    type MappedSelf<MappedEv> = Preview<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Preview::new(self.context.map_event(f))
    }
}

impl<Ev> Preview<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PreviewOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn create(&self, handle: PreviewHandle, raw_ref: String) {
        self.notify(PreviewOperation::Create { handle, raw_ref });
    }

    pub fn release(&self, handle: PreviewHandle) {
        self.notify(PreviewOperation::Release { handle });
    }

    fn notify(&self, operation: PreviewOperation) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
