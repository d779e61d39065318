pub mod driver;
pub mod stage1_collect;
pub mod stage2_calibrate;
pub mod stage3_aggregate;
pub mod stage4_sink;
pub mod stage5_metrics;
