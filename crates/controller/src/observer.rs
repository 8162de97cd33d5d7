//! Subscriber list for gesture notifications.

use dragline_gesture_model::notification::GestureEvent;

/// Receives drag/drop notifications.
///
/// The event borrows the controller's state and is only valid for the
/// duration of the call. Implemented for any matching closure.
pub trait Observer<T> {
    fn notify(&mut self, event: &GestureEvent<'_, T>);
}

impl<T, F> Observer<T> for F
where
    F: FnMut(&GestureEvent<'_, T>),
{
    fn notify(&mut self, event: &GestureEvent<'_, T>) {
        self(event)
    }
}

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of observers. Notification order is subscription order.
pub(crate) struct Observers<T> {
    entries: Vec<(SubscriptionId, Box<dyn Observer<T>>)>,
    next_id: u64,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Observers<T> {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn Observer<T>>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    /// Returns false if `id` was already removed.
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, event: &GestureEvent<'_, T>) {
        for (_, observer) in &mut self.entries {
            observer.notify(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragline_gesture_model::notification::Delta;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn boxed<F>(f: F) -> Box<dyn Observer<&'static str>>
    where
        F: FnMut(&GestureEvent<'_, &'static str>) + 'static,
    {
        Box::new(f)
    }

    #[test]
    fn test_notify_in_subscription_order_and_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers: Observers<&'static str> = Observers::default();

        let first = {
            let seen = seen.clone();
            observers.subscribe(boxed(move |e| {
                seen.borrow_mut().push(format!("first:{}", e.subject()))
            }))
        };
        {
            let seen = seen.clone();
            observers.subscribe(boxed(move |e| {
                seen.borrow_mut().push(format!("second:{}", e.subject()))
            }));
        }

        let subject = "card";
        observers.notify(&GestureEvent::Drag {
            subject: &subject,
            delta: Delta::ZERO,
        });
        assert_eq!(*seen.borrow(), vec!["first:card", "second:card"]);

        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        assert_eq!(observers.len(), 1);
    }
}
