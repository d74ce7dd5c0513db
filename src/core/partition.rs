use crate::core::compatibility::is_compatible;
use crate::models::{Pair, Pairing, Participant};

/// Slice a winning ordering into delivered pairs plus an optional leftover
///
/// With an odd count the last participant is left over. The rest are paired
/// 0-1, 2-3, ... in order, whether or not the compatibility rule accepted
/// them.
pub fn partition(order: Vec<Participant>) -> Pairing {
    let mut order = order;
    let leftover = if order.len() % 2 != 0 { order.pop() } else { None };

    let mut pairs = Vec::with_capacity(order.len() / 2);
    let mut members = order.into_iter();
    while let (Some(first), Some(second)) = (members.next(), members.next()) {
        let compatible = is_compatible(&first, &second);
        pairs.push(Pair {
            first,
            second,
            compatible,
        });
    }

    Pairing { pairs, leftover }
}
