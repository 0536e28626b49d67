/// Records each queue holds before its producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Worker count used by layers that do not specify one.
pub const DEFAULT_LAYER_WORKERS: usize = 10;
