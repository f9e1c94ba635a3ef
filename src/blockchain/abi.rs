//! Settlement contract ABI, compiled in.
//!
//! The contract is deployed externally; only the pieces this crate touches
//! are declared here. Because the schema is expanded at build time there is
//! no runtime ABI parsing and therefore no schema error path.

use alloy::sol;

sol! {
    /// Records an inference attestation and returns its id.
    function verifyAndRecord(bytes32 modelId, bytes32 inputHash, bytes32 outputCommitment) external returns (bytes32 attestationId);

    /// Emitted by the settlement contract for every recorded attestation.
    #[derive(Debug, PartialEq, Eq)]
    event InferenceRecorded(
        bytes32 indexed modelId,
        bytes32 indexed inputHash,
        bytes32 outputCommitment,
        address indexed prover,
        bytes32 attestationId
    );
}
