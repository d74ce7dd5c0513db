use crate::models::Participant;

/// Check whether two participants may be paired
///
/// Each side's lowest acceptable pairing level must not exceed the other
/// side's experience. Both directions are evaluated; the rule is not assumed
/// to be symmetric.
#[inline]
pub fn is_compatible(a: &Participant, b: &Participant) -> bool {
    accepts(a, b) && accepts(b, a)
}

/// Whether `chooser` is willing to pair with someone of `partner`'s experience
#[inline]
fn accepts(chooser: &Participant, partner: &Participant) -> bool {
    chooser
        .min_preference()
        .is_some_and(|min| min.ordinal() <= partner.experience.ordinal())
}
