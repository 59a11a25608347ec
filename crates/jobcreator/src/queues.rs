// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue names specific to the job creator (§4.1, §4.4).

/// The job creator's main inbox for submitted job documents.
pub const JOB_DOCUMENT_QUEUE: &str = "jobcreator.service";

/// The job creator's own inbox for `job_delete` requests, the trigger for
/// `handle_job_delete`'s fan-out to every pipeline stage (§4.4 step 6).
pub const JOB_DELETE_QUEUE: &str = "jobcreator.job_delete";

/// The job creator's own listener queue for `invalid_config` notices the
/// credentials courier and the pipeline stages publish back after a failed
/// pre-flight check or a factory error. Declared in `mash-transport` since a
/// stage listener service also needs to address it (§4.5 admission).
pub use mash_transport::job_creator_listener_queue as listener_queue;

/// `<stage>.job_delete` fanout, published to every pipeline stage on
/// `job_delete` (§4.4 step 6). Declared in `mash-transport` since every
/// stage service binds its own copy of this queue.
pub use mash_transport::job_delete_queue;
