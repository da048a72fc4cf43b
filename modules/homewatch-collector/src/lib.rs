pub mod dispatch;
pub mod fanout;
pub mod ingress;
pub mod pipeline;

pub use dispatch::ClaimDispatcher;
pub use fanout::{Fanout, FanoutResult, WritePolicy};
pub use ingress::{IngressState, InboundMessage, MqttIngress};
pub use pipeline::{worker_index, Pipeline, WorkerPool};
