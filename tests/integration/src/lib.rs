//! Integration tests for tokenvote against a live node.
//!
//! Anvil-dependent tests use **testcontainers** to spin up a Docker-based
//! Anvil node automatically.
//!
//! ```bash
//! # Run everything (Docker must be available):
//! cargo test -p tokenvote-integration-tests -- --include-ignored
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::{Address, B256, U256};
    use alloy::rpc::types::TransactionRequest;
    use testcontainers::{
        core::{IntoContainerPort, WaitFor},
        runners::SyncRunner,
        Container, GenericImage, ImageExt,
    };

    use tokenvote_core::config::Config;
    use tokenvote_core::{ChainClient, ChainError};
    use tokenvote_evm::{signer_from_hex, EvmChainClient};

    /// Anvil default account 0.
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    /// Anvil default account 1.
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    /// Spins up a Docker Anvil container and returns `(container, rpc_url)`.
    /// The container is dropped (and removed) when it goes out of scope.
    fn start_anvil() -> (Container<GenericImage>, String) {
        let image = GenericImage::new("ghcr.io/foundry-rs/foundry", "latest")
            .with_exposed_port(8545.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Listening on"))
            .with_entrypoint("anvil")
            .with_cmd(vec![
                "--host".to_string(),
                "0.0.0.0".to_string(),
                "--port".to_string(),
                "8545".to_string(),
                "--chain-id".to_string(),
                "31337".to_string(),
            ]);

        let container = image
            .start()
            .expect("Docker must be available to run Anvil tests");
        let host_port = container
            .get_host_port_ipv4(8545)
            .expect("failed to get mapped port");
        let url = format!("http://127.0.0.1:{}", host_port);
        (container, url)
    }

    /// A client whose "token" and "ballot" are plain accounts with no code.
    fn client_for(rpc_url: &str) -> EvmChainClient {
        let config = Config {
            rpc_url: rpc_url.to_string(),
            token_address: RECIPIENT.parse().unwrap(),
            ballot_address: RECIPIENT.parse().unwrap(),
            receipt_timeout_secs: 10,
            receipt_poll_interval_ms: 100,
            ..Config::default()
        };
        EvmChainClient::new(&config, signer_from_hex(ANVIL_KEY).unwrap()).unwrap()
    }

    #[test]
    #[ignore]
    fn test_signer_and_chain_id() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = client_for(&anvil_url);
            let expected: Address = ANVIL_ADDRESS.parse().unwrap();
            assert_eq!(client.signer_address(), expected);

            let chain_id = client.adapter().get_chain_id().await.unwrap();
            assert_eq!(chain_id, 31337, "Anvil default chain ID");
        });
    }

    #[test]
    #[ignore]
    fn test_unknown_transaction() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = client_for(&anvil_url);
            let hash = B256::repeat_byte(0xab);

            assert!(client.transaction_by_hash(hash).await.unwrap().is_none());
            let err = client.transaction_receipt_by_hash(hash).await.unwrap_err();
            assert!(matches!(err, ChainError::TransactionNotFound(h) if h == hash));
        });
    }

    #[test]
    #[ignore]
    fn test_sent_transaction_is_found_and_mined() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = client_for(&anvil_url);
            let recipient: Address = RECIPIENT.parse().unwrap();

            let tx = TransactionRequest::default()
                .to(recipient)
                .value(U256::from(1_000_000_000_000_000u64)); // 0.001 ETH
            let pending = tokenvote_evm::tx::send_transaction(client.adapter(), tx)
                .await
                .expect("transfer should succeed on Anvil");
            assert_ne!(pending.hash, B256::ZERO);
            assert_eq!(pending.to, recipient);
            assert_eq!(pending.from, client.signer_address());

            let found = client
                .transaction_by_hash(pending.hash)
                .await
                .unwrap()
                .expect("node should know the submitted transaction");
            assert_eq!(found["hash"], serde_json::json!(pending.hash));

            let receipt = tokio::time::timeout(
                Duration::from_secs(15),
                client.transaction_receipt_by_hash(pending.hash),
            )
            .await
            .expect("receipt wait should finish")
            .unwrap();
            assert_eq!(receipt["status"], "0x1");
        });
    }

    #[test]
    #[ignore]
    fn test_contract_read_against_account_without_code() {
        let (_anvil, anvil_url) = start_anvil();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = client_for(&anvil_url);
            // eth_call to an EOA returns empty data, which cannot decode as uint256.
            let err = client.total_supply().await.unwrap_err();
            assert!(matches!(err, ChainError::AbiDecode(_)));
        });
    }
}
