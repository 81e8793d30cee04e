// gRPC surface of the engine. Generated code comes from proto/signals.proto via build.rs.
pub mod generated {
    tonic::include_proto!("signals");
}

pub mod signal_service;

pub use generated::signal_engine_server::{SignalEngine, SignalEngineServer};
pub use generated::{
    AnalyzeCsvRequest, Candle as ProtoCandle, IndicatorPoint, ReportRequest, ReportResponse,
    TradeSetup as ProtoTradeSetup,
};
