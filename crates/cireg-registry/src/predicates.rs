//! Composable descriptor and property predicates
//!
//! Small boolean closures over [`Descriptor`] and [`PropertyDescriptor`],
//! combined with [`not`] and [`or`].

use crate::descriptors::DescriptorSnapshot;
use cireg_model::{udm, Descriptor, PropertyDescriptor, Type};
use std::sync::Arc;

/// Negate a predicate
pub fn not<T, P>(predicate: P) -> impl Fn(&T) -> bool
where
    T: ?Sized,
    P: Fn(&T) -> bool,
{
    move |value| !predicate(value)
}

/// Either predicate holds
pub fn or<T, A, B>(a: A, b: B) -> impl Fn(&T) -> bool
where
    T: ?Sized,
    A: Fn(&T) -> bool,
    B: Fn(&T) -> bool,
{
    move |value| a(value) || b(value)
}

/// Descriptor's type is `ty` or a subtype of it
pub fn assignable_to(ty: Type) -> impl Fn(&Descriptor) -> bool {
    move |descriptor| descriptor.is_assignable_to(&ty)
}

/// Property is hidden
pub fn hidden() -> impl Fn(&PropertyDescriptor) -> bool {
    PropertyDescriptor::is_hidden
}

/// Property has the given name
pub fn named(name: impl Into<String>) -> impl Fn(&PropertyDescriptor) -> bool {
    let name = name.into();
    move |pd| pd.name() == name
}

/// Property is a containment CI collection whose referenced type is
/// `ancestor` or one of its subtypes
pub fn contains_subtype_of(
    snapshot: Arc<DescriptorSnapshot>,
    ancestor: Type,
) -> impl Fn(&PropertyDescriptor) -> bool {
    move |pd| {
        pd.is_containment_collection()
            && pd
                .referenced_type()
                .is_some_and(|referenced| snapshot.is_subtype(referenced, &ancestor))
    }
}

/// Property holds embedded deployables
pub fn embedded(snapshot: Arc<DescriptorSnapshot>) -> impl Fn(&PropertyDescriptor) -> bool {
    contains_subtype_of(snapshot, Type::new(udm::EMBEDDED_DEPLOYABLE))
}

/// Property is shown in deployable editors: not hidden, not `tags`, and
/// not an embedded-deployable collection
pub fn editable(snapshot: Arc<DescriptorSnapshot>) -> impl Fn(&PropertyDescriptor) -> bool {
    not(or(or(hidden(), named(udm::TAGS_PROPERTY)), embedded(snapshot)))
}
