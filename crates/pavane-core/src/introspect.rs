//! Introspection operations: server info and object lists.

use pavane_proto::{
    Command, TagStructReader,
    introspect::{CardInfo, ModuleInfo, ServerInfo, SinkInfo},
};

use crate::{client::Client, error::ClientError};

impl Client {
    /// Fetch global server information.
    pub async fn server_info(&self) -> Result<ServerInfo, ClientError> {
        let body = self.request(Command::GetServerInfo).await?;
        let mut ts = TagStructReader::new(&body);
        Ok(ServerInfo::read_from(&mut ts)?)
    }

    /// List all sinks.
    pub async fn sinks(&self) -> Result<Vec<SinkInfo>, ClientError> {
        let body = self.request(Command::GetSinkInfoList).await?;
        let mut ts = TagStructReader::new(&body);
        let mut sinks = Vec::new();
        while !ts.is_empty() {
            sinks.push(SinkInfo::read_from(&mut ts)?);
        }
        Ok(sinks)
    }

    /// List all loaded modules.
    pub async fn modules(&self) -> Result<Vec<ModuleInfo>, ClientError> {
        let body = self.request(Command::GetModuleInfoList).await?;
        let mut ts = TagStructReader::new(&body);
        let mut modules = Vec::new();
        while !ts.is_empty() {
            modules.push(ModuleInfo::read_from(&mut ts)?);
        }
        Ok(modules)
    }

    /// List all cards.
    pub async fn cards(&self) -> Result<Vec<CardInfo>, ClientError> {
        let body = self.request(Command::GetCardInfoList).await?;
        let mut ts = TagStructReader::new(&body);
        let mut cards = Vec::new();
        while !ts.is_empty() {
            cards.push(CardInfo::read_from(&mut ts)?);
        }
        Ok(cards)
    }

    /// Activate a profile on a card. The card is addressed by index, so
    /// the name slot is sent absent.
    pub async fn set_card_profile(
        &self,
        card_index: u32,
        profile_name: &str,
    ) -> Result<(), ClientError> {
        self.request_with(Command::SetCardProfile, |w| {
            w.put_u32(card_index);
            w.put_string_null();
            w.put_string(profile_name);
        })
        .await?;
        Ok(())
    }

    /// Change the server's default sink.
    pub async fn set_default_sink(&self, sink_name: &str) -> Result<(), ClientError> {
        self.request_with(Command::SetDefaultSink, |w| w.put_string(sink_name)).await?;
        Ok(())
    }
}
