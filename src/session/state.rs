//! Session value and the signing capability derived from it

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::json;
use std::fmt;

use super::error::{SessionError, SessionResult};
use crate::core::methods::rpc;
use crate::core::{Address, ChainId};
use crate::transport::Transport;

/// Capability to request signatures from the wallet for one account.
#[derive(Clone)]
pub struct Signer {
    transport: Transport,
    address: Address,
}

impl Signer {
    pub fn new(transport: Transport, address: Address) -> Self { Self { transport, address } }

    pub fn address(&self) -> &Address { &self.address }

    /// `personal_sign` over the UTF-8 bytes of `message`; returns the
    /// wallet's `0x`-hex signature.
    pub async fn sign_message(&self, message: &str) -> SessionResult<String> {
        let params = json!([format!("0x{}", hex::encode(message.as_bytes())), self.address.as_str()]);
        let value = self.transport.request(rpc::PERSONAL_SIGN, params).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| SessionError::InvalidResponse(format!("signature is not a string: {value}")))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("address", &self.address).finish()
    }
}

/// Binding between the application and the user's wallet.
///
/// Either empty (default) or fully populated; the manager never builds a
/// partially filled value.
#[derive(Clone, Default)]
pub struct Session {
    provider: Option<Transport>,
    signer: Option<Signer>,
    account: Option<Address>,
    chain_id: Option<ChainId>,
}

impl Session {
    pub fn empty() -> Self { Self::default() }

    pub(crate) fn connected(provider: Transport, account: Address, chain_id: ChainId) -> Self {
        let signer = Signer::new(provider.clone(), account.clone());
        Self { provider: Some(provider), signer: Some(signer), account: Some(account), chain_id: Some(chain_id) }
    }

    pub fn provider(&self) -> Option<&Transport> { self.provider.as_ref() }
    pub fn signer(&self) -> Option<&Signer> { self.signer.as_ref() }
    pub fn account(&self) -> Option<&Address> { self.account.as_ref() }

    /// Only meaningful while connected.
    pub fn chain_id(&self) -> Option<ChainId> { self.chain_id }

    pub fn is_connected(&self) -> bool { self.provider.is_some() && self.account.is_some() }

    /// Same field values (providers compared by identity).
    pub fn same_as(&self, other: &Session) -> bool {
        let same_provider = match (&self.provider, &other.provider) {
            (Some(a), Some(b)) => std::sync::Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_provider && self.account == other.account && self.chain_id == other.chain_id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("is_connected", &self.is_connected())
            .finish()
    }
}

/// JS-facing snapshot: `{account, chainId, isConnected, provider}`.
impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Session", 4)?;
        st.serialize_field("account", &self.account)?;
        st.serialize_field("chainId", &self.chain_id)?;
        st.serialize_field("isConnected", &self.is_connected())?;
        st.serialize_field("provider", &self.provider.as_ref().map(|p| p.name()))?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryWallet;
    use std::sync::Arc;

    #[test]
    fn test_empty_is_disconnected() {
        let s = Session::empty();
        assert!(!s.is_connected());
        assert!(s.provider().is_none() && s.signer().is_none() && s.account().is_none() && s.chain_id().is_none());
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"account": null, "chainId": null, "isConnected": false, "provider": null})
        );
    }

    #[test]
    fn test_connected_snapshot() {
        let transport: Transport = Arc::new(MemoryWallet::new().with_name("test-wallet"));
        let account = Address::parse("0xabcdef0123456789abcdef0123456789abcd1234").unwrap();
        let s = Session::connected(transport, account.clone(), ChainId(137));
        assert!(s.is_connected());
        assert_eq!(s.signer().unwrap().address(), &account);
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "account": "0xabcdef0123456789abcdef0123456789abcd1234",
                "chainId": 137,
                "isConnected": true,
                "provider": "test-wallet"
            })
        );
        assert!(s.same_as(&s.clone()));
        assert!(!s.same_as(&Session::empty()));
    }
}
