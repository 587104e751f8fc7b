// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use ::flexi_logger::Logger;
use ::std::sync::Once;

//==============================================================================
// Constants
//==============================================================================

/// Log specification used when `RUST_LOG` is not set.
const DEFAULT_LOG_SPEC: &str = "warn";

//==============================================================================
// Static Variables
//==============================================================================

/// Guardian to the logging initialize function.
static INIT_LOG: Once = Once::new();

//==============================================================================
// Standalone Functions
//==============================================================================

/// Initializes logging features.
pub fn initialize() {
    INIT_LOG.call_once(|| {
        // Configured from the RUST_LOG environment variable.
        let logger: Logger = match Logger::try_with_env_or_str(DEFAULT_LOG_SPEC) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("logging::initialize(): invalid log specification ({})", e);
                return;
            },
        };
        match logger.start() {
            // The handle shuts the logger down when dropped, so it lives for the rest of the program.
            Ok(handle) => ::std::mem::forget(handle),
            Err(e) => eprintln!("logging::initialize(): failed to start logger ({})", e),
        }
    });
}
