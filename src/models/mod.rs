//! Timetabling domain models.
//!
//! Immutable instance data (courses, rooms, teachers, the slot domain)
//! and the candidate solution type.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School | Training centre |
//! |-------------|------------|--------|-----------------|
//! | Course | Lecture | Subject | Workshop |
//! | Teacher | Lecturer | Teacher | Trainer |
//! | Room | Lecture hall | Classroom | Studio |
//! | TimeSlot | Day × period | Day × lesson | Day × session |
//! | Schedule | Semester timetable | Weekly plan | Course calendar |

mod course;
mod instance;
mod room;
mod schedule;
mod teacher;
mod timeslot;

pub use course::Course;
pub use instance::{Instance, InstanceData, Lesson};
pub use room::Room;
pub use schedule::{Schedule, ScheduledLesson, TimetableEntry};
pub use teacher::Teacher;
pub use timeslot::TimeSlot;
