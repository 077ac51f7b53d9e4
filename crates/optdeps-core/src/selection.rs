//! The ordered set of packages chosen by the user.

use crate::package::OptionalPackage;

/// Packages selected during the prompt loop, in the order they were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    packages: Vec<OptionalPackage>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, package: OptionalPackage) {
        self.packages.push(package);
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionalPackage> {
        self.packages.iter()
    }

    /// Packages destined for `require`.
    pub fn runtime(&self) -> impl Iterator<Item = &OptionalPackage> {
        self.packages.iter().filter(|p| !p.is_dev())
    }

    /// Packages destined for `require-dev`.
    pub fn development(&self) -> impl Iterator<Item = &OptionalPackage> {
        self.packages.iter().filter(|p| p.is_dev())
    }

    /// Names the installer is allowed to touch, in selection order.
    pub fn whitelist(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name().to_string()).collect()
    }
}

impl FromIterator<OptionalPackage> for Selection {
    fn from_iter<T: IntoIterator<Item = OptionalPackage>>(iter: T) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a OptionalPackage;
    type IntoIter = std::slice::Iter<'a, OptionalPackage>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}
