/// Role a principal needs to work with cash cards.
pub const CARD_OWNER_ROLE: &str = "card-owner";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    /// A principal holding the card owner role, as the CLI acts on behalf of.
    pub fn card_owner(name: impl Into<String>) -> Self {
        Self::new(name).with_role(CARD_OWNER_ROLE)
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
