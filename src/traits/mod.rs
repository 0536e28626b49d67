// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consumer;
pub mod distributor;
pub mod emitter;
pub mod generator;
pub mod stage;

pub use consumer::Consumer;
pub use distributor::Distributor;
pub use emitter::Emitter;
pub use generator::Generator;
pub use stage::Stage;
