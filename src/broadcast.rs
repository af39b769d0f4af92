use std::{cell::RefCell, collections::HashSet, rc::Rc};

use crate::{
    hit_objects::{Hit, HitObject, ObjectId},
    judgement::JudgementResult,
};

pub trait ResultSubscriber {
    fn on_result(&mut self, object: &HitObject, result: &JudgementResult);
}

impl<F: FnMut(&HitObject, &JudgementResult)> ResultSubscriber for F {
    fn on_result(&mut self, object: &HitObject, result: &JudgementResult) {
        self(object, result)
    }
}

/// Lets the caller keep a handle on a subscriber after registering it
pub fn shared<T: ResultSubscriber + 'static>(inner: &Rc<RefCell<T>>) -> impl ResultSubscriber + 'static {
    let inner = inner.clone();
    move |object: &HitObject, result: &JudgementResult| inner.borrow_mut().on_result(object, result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Delivers results to every subscriber in registration order,
/// at most once per subscriber and object
#[derive(Default)]
pub struct ResultBroadcast {
    next_id: u32,
    subscribers: Vec<(SubscriberId, Box<dyn ResultSubscriber>)>,
    delivered: HashSet<(SubscriberId, ObjectId)>,
}

impl ResultBroadcast {
    pub fn subscribe(&mut self, subscriber: impl ResultSubscriber + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;

        self.subscribers.push((id, Box::new(subscriber)));

        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let len = self.subscribers.len();
        self.subscribers.retain(|(x, _)| *x != id);
        self.delivered.retain(|(x, _)| *x != id);

        len != self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn broadcast(&mut self, object: &HitObject, result: &JudgementResult) {
        for (id, subscriber) in self.subscribers.iter_mut() {
            if !self.delivered.insert((*id, result.object_id)) {
                tracing::warn!("Result for {:?} was already delivered to {:?}", result.object_id, id);
                continue;
            }

            subscriber.on_result(object, result);
        }
    }
}

/// Counts results per kind
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JudgementCounter {
    pub x300: u16,
    pub x100: u16,
    pub x50: u16,
    pub xmiss: u16,
}

impl JudgementCounter {
    pub fn total(&self) -> u16 {
        self.x300 + self.x100 + self.x50 + self.xmiss
    }
}

impl ResultSubscriber for JudgementCounter {
    fn on_result(&mut self, _object: &HitObject, result: &JudgementResult) {
        match result.hit {
            Hit::X300 => self.x300 += 1,
            Hit::X100 => self.x100 += 1,
            Hit::X50 => self.x50 += 1,
            Hit::MISS => self.xmiss += 1,
        }
    }
}
