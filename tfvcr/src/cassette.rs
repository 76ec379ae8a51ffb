use crate::{
    data::{InteractionData, RequestDescriptor},
    error::Error,
    markdown, matcher,
};
use std::path::Path;

/// Recorded interactions of one test, replayed against live requests.
///
/// Every interaction is replayed at most once. When several recorded
/// interactions match the same live request they are handed out in
/// recorded order.
#[derive(Debug, Clone, Default)]
pub struct Cassette {
    interactions: Vec<RecordedInteraction>,
}

#[derive(Debug, Clone)]
struct RecordedInteraction {
    data: InteractionData,
    request: RequestDescriptor,
    replayed: bool,
}

impl Cassette {
    pub fn from_interactions<I: IntoIterator<Item = InteractionData>>(interactions: I) -> Self {
        Self {
            interactions: interactions
                .into_iter()
                .map(|data| RecordedInteraction {
                    request: RequestDescriptor::from_recorded(&data.request_data),
                    data,
                    replayed: false,
                })
                .collect(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let interactions = markdown::load_interactions(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            interactions = interactions.len(),
            "loaded cassette"
        );

        Ok(Self::from_interactions(interactions))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        markdown::save_interactions(path, self.interactions.iter().map(|i| &i.data))?;

        Ok(())
    }

    /// Finds the first interaction not replayed yet whose request matches
    /// `live`, and marks it as replayed.
    pub fn take_match(&mut self, live: &RequestDescriptor) -> Option<InteractionData> {
        let found = self
            .interactions
            .iter_mut()
            .find(|interaction| !interaction.replayed && matcher::matches(live, &interaction.request));

        match found {
            Some(interaction) => {
                interaction.replayed = true;
                tracing::debug!(
                    request = %live.summary(),
                    interaction = interaction.data.interaction_number,
                    "replaying recorded interaction"
                );
                Some(interaction.data.clone())
            }
            None => {
                tracing::warn!(request = %live.summary(), "no recorded interaction matches");
                None
            }
        }
    }

    /// Interactions that were never handed out.
    pub fn unplayed(&self) -> Vec<&InteractionData> {
        self.interactions
            .iter()
            .filter(|interaction| !interaction.replayed)
            .map(|interaction| &interaction.data)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}
