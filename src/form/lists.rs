//! Editing of the repeatable form sections (family members, education).

use crate::domain::profile::{EducationEntry, EducationField, FamilyMember, FamilyMemberField};
use crate::form::validation::ErrorMap;

pub trait ListEntry: Clone + Default {
    type Field: Copy;

    /// Prefix of this list's error keys, e.g. `familyMember.0.name`.
    const ERROR_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn field_key(field: Self::Field) -> &'static str;
    fn field_mut(&mut self, field: Self::Field) -> &mut String;
}

impl ListEntry for FamilyMember {
    type Field = FamilyMemberField;
    const ERROR_PREFIX: &'static str = "familyMember";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn field_key(field: FamilyMemberField) -> &'static str {
        field.key()
    }

    fn field_mut(&mut self, field: FamilyMemberField) -> &mut String {
        match field {
            FamilyMemberField::Relationship => &mut self.relationship,
            FamilyMemberField::Name => &mut self.name,
            FamilyMemberField::Contact => &mut self.contact,
            FamilyMemberField::Occupation => &mut self.occupation,
            FamilyMemberField::Remarks => &mut self.remarks,
        }
    }
}

impl ListEntry for EducationEntry {
    type Field = EducationField;
    const ERROR_PREFIX: &'static str = "education";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn field_key(field: EducationField) -> &'static str {
        field.key()
    }

    fn field_mut(&mut self, field: EducationField) -> &mut String {
        match field {
            EducationField::Degree => &mut self.degree,
            EducationField::Institute => &mut self.institute,
            EducationField::Board => &mut self.board,
            EducationField::Year => &mut self.year,
            EducationField::Grade => &mut self.grade,
            EducationField::Document => &mut self.document,
        }
    }
}

/// Borrowed view over one list of the form. Mutations flag the form dirty and
/// drop stale errors for the touched entry.
pub struct DynamicList<'a, T: ListEntry> {
    items: &'a mut Vec<T>,
    dirty: &'a mut bool,
    errors: &'a mut ErrorMap,
}

impl<'a, T: ListEntry> DynamicList<'a, T> {
    pub(crate) fn new(items: &'a mut Vec<T>, dirty: &'a mut bool, errors: &'a mut ErrorMap) -> Self {
        Self {
            items,
            dirty,
            errors,
        }
    }

    pub fn items(&self) -> &[T] {
        self.items
    }

    fn next_id(&self) -> u64 {
        self.items
            .iter()
            .filter_map(|item| item.id().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Appends a blank entry and returns its id.
    pub fn add(&mut self) -> String {
        let id = self.next_id().to_string();
        let mut entry = T::default();
        entry.set_id(id.clone());
        self.items.push(entry);
        *self.dirty = true;
        id
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let changed = self.items.len() != before;
        if changed {
            // indices shift, so per-entry errors no longer line up
            let prefix = format!("{}.", T::ERROR_PREFIX);
            let stale: Vec<String> = self
                .errors
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(key, _)| key.to_string())
                .collect();
            for key in stale {
                self.errors.remove(&key);
            }
            *self.dirty = true;
        }
        changed
    }

    pub fn update(&mut self, id: &str, field: T::Field, value: impl Into<String>) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return false;
        };
        *self.items[index].field_mut(field) = value.into();
        self.errors.remove(&format!(
            "{}.{}.{}",
            T::ERROR_PREFIX,
            index,
            T::field_key(field)
        ));
        *self.dirty = true;
        true
    }

    /// Appends entries under fresh ids, ignoring whatever ids they carried.
    pub fn add_bulk(&mut self, entries: impl IntoIterator<Item = T>) -> usize {
        let mut next = self.next_id();
        let mut added = 0;
        for mut entry in entries {
            entry.set_id(next.to_string());
            next += 1;
            self.items.push(entry);
            added += 1;
        }
        if added > 0 {
            *self.dirty = true;
        }
        added
    }
}

impl DynamicList<'_, EducationEntry> {
    /// Stores an uploaded certificate (data URL or path) on the entry.
    pub fn attach_document(&mut self, id: &str, data: impl Into<String>) -> bool {
        self.update(id, EducationField::Document, data)
    }
}
