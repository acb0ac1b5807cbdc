// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;
use std::sync::Arc;

use crate::recovery::RecoveryWorkflow;
use crate::validation::ValidatorChain;

#[derive(Clone)]
pub struct AppState {
    pub recovery: Arc<RecoveryWorkflow>,
    pub validators: Arc<ValidatorChain>,
    /// Checked by the readiness probe.
    pub data_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(recovery: RecoveryWorkflow, validators: ValidatorChain) -> Self {
        Self {
            recovery: Arc::new(recovery),
            validators: Arc::new(validators),
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }
}
