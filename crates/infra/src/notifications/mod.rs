pub mod twilio_client;
